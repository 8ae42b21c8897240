use crate::result::Notification;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub input: String,
    pub pattern: Option<String>,
    pub model: Option<String>,
    pub context: Option<String>,
    pub running: bool,
    pub output: Option<String>,
    pub output_is_error: bool,
    pub notifications: Vec<Notification>,
    pub rejected_triggers: usize,
    pub dirty: bool,
}
