use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImgGenError>;

/// 失败时所处的操作阶段：文生图为 generation，图生图为 transformation。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Generation,
    Transformation,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Generation => "generation",
            Operation::Transformation => "transformation",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownTool,
    InvalidArgument,
    InputNotFound,
    InputNotAFile,
    NoCandidates,
    NoImageData,
    GenerationFailed,
    Config,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::UnknownTool => "UnknownTool",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::InputNotFound => "InputNotFound",
            ErrorKind::InputNotAFile => "InputNotAFile",
            ErrorKind::NoCandidates => "NoCandidates",
            ErrorKind::NoImageData => "NoImageData",
            ErrorKind::GenerationFailed => "GenerationFailed",
            ErrorKind::Config => "Config",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ImgGenError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: String, reason: &'static str },
    #[error("input image not found: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("input path is not a file: {}", .0.display())]
    InputNotAFile(PathBuf),
    #[error("no image generated")]
    NoCandidates,
    #[error("no image data in response")]
    NoImageData,
    #[error("{class}: {message}")]
    GenerationFailed {
        class: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
    #[error("configuration error: {0}")]
    Config(String),
    #[error("image {operation} failed: {}: {cause}\n\nTrace:\n{trace}", .cause.kind())]
    Pipeline {
        operation: Operation,
        #[source]
        cause: Box<ImgGenError>,
        trace: String,
    },
}

impl ImgGenError {
    pub fn missing(field: impl Into<String>) -> Self {
        ImgGenError::InvalidArgument {
            field: field.into(),
            reason: "is required",
        }
    }

    /// 将外部错误（模型客户端、解码、文件 I/O）收敛为 `GenerationFailed`，保留类型名与错误链。
    pub fn generation_failed<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ImgGenError::GenerationFailed {
            class: std::any::type_name::<E>(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn generation_failed_msg(class: &'static str, message: impl Into<String>) -> Self {
        ImgGenError::GenerationFailed {
            class,
            message: message.into(),
            source: None,
        }
    }

    /// 附加操作名与诊断信息（错误链 + 调用栈）；已包装的错误原样返回。
    pub fn in_pipeline(operation: Operation, tool: &str, cause: ImgGenError) -> Self {
        if let ImgGenError::Pipeline { .. } = cause {
            return cause;
        }
        let trace = diagnostic_trace(operation, tool, &cause);
        ImgGenError::Pipeline {
            operation,
            cause: Box::new(cause),
            trace,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ImgGenError::UnknownTool(_) => ErrorKind::UnknownTool,
            ImgGenError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ImgGenError::InputNotFound(_) => ErrorKind::InputNotFound,
            ImgGenError::InputNotAFile(_) => ErrorKind::InputNotAFile,
            ImgGenError::NoCandidates => ErrorKind::NoCandidates,
            ImgGenError::NoImageData => ErrorKind::NoImageData,
            ImgGenError::GenerationFailed { .. } => ErrorKind::GenerationFailed,
            ImgGenError::Config(_) => ErrorKind::Config,
            ImgGenError::Pipeline { cause, .. } => cause.kind(),
        }
    }

    /// 包装之下的原始错误，未包装时返回自身。
    pub fn cause(&self) -> &ImgGenError {
        match self {
            ImgGenError::Pipeline { cause, .. } => cause.as_ref(),
            other => other,
        }
    }

    pub fn operation(&self) -> Option<Operation> {
        match self {
            ImgGenError::Pipeline { operation, .. } => Some(*operation),
            _ => None,
        }
    }
}

fn diagnostic_trace(operation: Operation, tool: &str, cause: &ImgGenError) -> String {
    let mut lines = vec![
        format!("operation: {operation}"),
        format!("tool: {tool}"),
        format!("kind: {}", cause.kind()),
    ];
    if let ImgGenError::GenerationFailed { class, .. } = cause {
        lines.push(format!("class: {class}"));
    }

    lines.push(format!("{:>4}: {cause}", 0));
    // GenerationFailed already renders its source's message on the line above.
    let mut current = match cause {
        ImgGenError::GenerationFailed {
            source: Some(inner),
            ..
        } => inner.source(),
        other => other.source(),
    };
    let mut depth = 1;
    while let Some(err) = current {
        lines.push(format!("{depth:>4}: {err}"));
        current = err.source();
        depth += 1;
    }

    lines.push(format!("backtrace:\n{}", Backtrace::force_capture()));
    lines.join("\n")
}
