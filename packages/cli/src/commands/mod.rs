pub mod choice;
pub mod component;
pub mod header;
pub mod image;
pub mod init;
pub mod project;
pub mod save;
pub mod session;
pub mod show;
pub mod step;

pub use choice::{choice, ChoiceCommand};
pub use component::{component, ComponentCommand};
pub use header::{header, HeaderArgs};
pub use image::{image_url, ImageUrlArgs};
pub use init::{init, InitArgs};
pub use save::{backups, publish, save, BackupsArgs};
pub use session::{session, SessionArgs};
pub use show::{show, ShowArgs};
pub use step::{step, StepCommand};
