use thiserror::Error;

use crate::model::ResultError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Result(#[from] ResultError),
}
