#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum FlowName {
    Authorize,
    Capture,
    Purchase,
    Recurring,
}
