use anyhow::Result;
use clap::Args;
use quizfunnel_editor::{optimize_image_url, ImageSettings};

/// Rewrite a Cloudinary delivery URL with transformation parameters
#[derive(Debug, Args)]
pub struct ImageUrlArgs {
    pub url: String,

    /// e.g. auto, auto:best, 80
    #[arg(short, long)]
    pub quality: Option<String>,

    /// e.g. auto, webp, avif
    #[arg(short, long)]
    pub format: Option<String>,

    #[arg(short, long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// e.g. fill, fit, limit
    #[arg(short, long)]
    pub crop: Option<String>,
}

impl From<&ImageUrlArgs> for ImageSettings {
    fn from(args: &ImageUrlArgs) -> Self {
        let settings = ImageSettings {
            quality: args.quality.clone(),
            format: args.format.clone(),
            width: args.width,
            height: args.height,
            crop: args.crop.clone(),
        };

        if settings == ImageSettings::default() {
            ImageSettings::auto()
        } else {
            settings
        }
    }
}

pub fn image_url(args: ImageUrlArgs) -> Result<()> {
    let settings = ImageSettings::from(&args);
    println!("{}", optimize_image_url(&args.url, &settings));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(url: &str) -> ImageUrlArgs {
        ImageUrlArgs {
            url: url.to_string(),
            quality: None,
            format: None,
            width: None,
            height: None,
            crop: None,
        }
    }

    #[test]
    fn test_no_flags_means_auto() {
        let settings = ImageSettings::from(&args("https://example.com/a.jpg"));
        assert_eq!(settings, ImageSettings::auto());
    }

    #[test]
    fn test_flags_become_settings() {
        let mut args = args("https://res.cloudinary.com/demo/image/upload/a.jpg");
        args.width = Some(400);
        args.crop = Some("fill".to_string());

        let settings = ImageSettings::from(&args);
        assert_eq!(
            optimize_image_url(&args.url, &settings),
            "https://res.cloudinary.com/demo/image/upload/w_400,c_fill/a.jpg"
        );
    }
}
