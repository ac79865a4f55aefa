use crate::commands::project::Project;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use quizfunnel_editor::{form_for, Document, FieldKind, Step};

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Only show this step
    #[arg(short, long)]
    pub step: Option<String>,

    /// Show the editable fields of one component
    #[arg(short, long, conflicts_with = "step")]
    pub component: Option<String>,

    /// Print the raw document JSON
    #[arg(long)]
    pub json: bool,
}

pub fn show(args: ShowArgs, cwd: &str) -> Result<()> {
    let project = Project::open(cwd)?;
    let session = project.session();
    let doc = session.document();

    if args.json {
        println!("{}", serde_json::to_string_pretty(doc)?);
        return Ok(());
    }

    if let Some(component_id) = &args.component {
        return show_fields(doc, component_id);
    }

    match &args.step {
        Some(step_id) => match doc.step(step_id) {
            Some(step) => print_step(doc, step),
            None => bail!("No step with id '{}'", step_id),
        },
        None => {
            print_header(doc);
            for step in &doc.steps {
                print_step(doc, step);
            }
        }
    }

    Ok(())
}

fn print_header(doc: &Document) {
    let flag = |on: bool| if on { "on".green() } else { "off".dimmed() };

    println!("{}", "Header".bright_blue().bold());
    println!(
        "  logo {}  progress bar {}  return {}  color {}",
        flag(doc.header.show_logo),
        flag(doc.header.show_progress_bar),
        flag(doc.header.allow_return),
        doc.header.progress_color
    );
    println!();
}

fn print_step(doc: &Document, step: &Step) {
    let marker = if step.id == doc.active_step_id {
        "▶".green().to_string()
    } else {
        " ".to_string()
    };

    let mut routing = Vec::new();
    if let Some(next) = &step.default_next_step {
        routing.push(format!("next → {}", next));
    }
    if let Some(page) = step.final_page {
        routing.push(format!("{:?} page", page).to_lowercase());
    }

    println!(
        "{} {} {} {}",
        marker,
        step.name.bold(),
        format!("({})", step.id).dimmed(),
        routing.join(", ").yellow()
    );

    for component in &step.components {
        println!(
            "    {:>2}. {:<9} {:<24} {}",
            component.order,
            component.component_type().to_string().cyan(),
            component.id,
            truncate(&component.props.summary(), 48).dimmed()
        );
    }
    println!();
}

fn show_fields(doc: &Document, component_id: &str) -> Result<()> {
    let Some(component) = doc.component(component_id) else {
        bail!("No component with id '{}'", component_id);
    };

    let form = form_for(component);
    println!(
        "{} {} {}",
        component.id.bold(),
        component.component_type().to_string().cyan(),
        format!("({} form)", form.kind()).dimmed()
    );

    for field in form.fields() {
        let value = form
            .value(field.name)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {:<16} {:<12} {}",
            field.name,
            kind_label(&field.kind).dimmed(),
            value
        );
    }

    if !component.props.style().is_empty() {
        println!("  style");
        for (key, value) in component.props.style() {
            println!("    {}: {}", key, value);
        }
    }

    if let Ok(options) = form.options() {
        println!("  choices");
        for (index, choice) in options.choices().iter().enumerate() {
            println!(
                "    [{}] {} {} score={}{}",
                index,
                choice.text,
                format!("({})", choice.value).dimmed(),
                choice.score.unwrap_or(0),
                choice
                    .next_step
                    .as_deref()
                    .map(|s| format!(" → {}", s))
                    .unwrap_or_default()
            );
        }
    }

    Ok(())
}

fn kind_label(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Text => "text".to_string(),
        FieldKind::MultilineText => "multiline".to_string(),
        FieldKind::Number { min, max } => format!("{}..={}", min, max),
        FieldKind::Toggle => "on/off".to_string(),
        FieldKind::Color => "color".to_string(),
        FieldKind::Url => "url".to_string(),
        FieldKind::Select(options) => options.join("|"),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max - 1).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("Introdução", 20), "Introdução");
        assert_eq!(truncate("Introdução", 6), "Intro…");
    }

    #[test]
    fn test_kind_label() {
        assert_eq!(kind_label(&FieldKind::Number { min: 1, max: 4 }), "1..=4");
        assert_eq!(kind_label(&FieldKind::Select(&["a", "b"])), "a|b");
    }
}
