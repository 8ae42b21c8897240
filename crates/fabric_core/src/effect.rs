use crate::operation::Operation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand the operation to the engine.
    Dispatch(Operation),
}
