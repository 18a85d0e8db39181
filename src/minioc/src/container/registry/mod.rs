mod modifier;
mod table;

use snafu::prelude::*;

use crate::key::TypeKey;

pub use crate::strategy::ConversionError;
pub use modifier::RegisterOptions;
pub(crate) use table::RegistrationTable;

#[derive(Debug, Clone, Snafu)]
#[non_exhaustive]
pub enum RegistrationError {
    #[snafu(display("there is no registration of {key} to modify"))]
    #[non_exhaustive]
    NotRegistered { key: TypeKey },
    #[snafu(display("could not modify the registration of {key}"))]
    #[non_exhaustive]
    Conversion {
        key: TypeKey,
        source: ConversionError,
    },
}

impl RegistrationError {
    pub fn key(&self) -> &TypeKey {
        match self {
            Self::NotRegistered { key } | Self::Conversion { key, .. } => key,
        }
    }
}
