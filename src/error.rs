use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classfile::ClassParseError;

pub type Result<T> = std::result::Result<T, ImportError>;

/// Failure of a whole import. There is no partial result: any error aborts.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("{}:{line}: {failure}", .path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        failure: ParseFailure,
    },
    #[error("{}: {failure}", .path.display())]
    Resource {
        path: PathBuf,
        failure: ResourceFailure,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    StructuralParse,
    Resource,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("missing column {index} (row has {found})")]
    MissingColumn { index: usize, found: usize },
    #[error("quoted documentation is not terminated")]
    UnterminatedQuote,
    #[error("{directive} needs {expected} tokens, found {found}")]
    MissingToken {
        directive: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("expected <owner>/<name>, found {0:?}")]
    MalformedMember(String),
    #[error("no field descriptor for {0} in the game jar")]
    UnknownFieldDescriptor(String),
}

#[derive(Debug, Error)]
pub enum ResourceFailure {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("corrupt archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("corrupt class file {entry}: {source}")]
    ClassFile {
        entry: String,
        #[source]
        source: ClassParseError,
    },
}

impl ImportError {
    pub fn parse(path: &Path, line: usize, failure: ParseFailure) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            line,
            failure,
        }
    }

    pub fn resource(path: &Path, failure: impl Into<ResourceFailure>) -> Self {
        Self::Resource {
            path: path.to_path_buf(),
            failure: failure.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { .. } => ErrorKind::StructuralParse,
            Self::Resource { .. } => ErrorKind::Resource,
        }
    }

    pub fn parse_failure(&self) -> Option<&ParseFailure> {
        match self {
            Self::Parse { failure, .. } => Some(failure),
            Self::Resource { .. } => None,
        }
    }
}
