use thiserror::Error;

/// SDK 错误类型
///
/// 只有构造阶段（打开本地数据库）会把错误返回给调用方；
/// 数据访问层的读写失败都在 `RichacksSDK` 内部被吸收。
#[derive(Debug, Error)]
pub enum RichacksSDKError {
    #[error("KV store error: {0}")]
    KvStore(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    IO(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<serde_json::Error> for RichacksSDKError {
    fn from(error: serde_json::Error) -> Self {
        RichacksSDKError::Serialization(error.to_string())
    }
}

impl From<std::io::Error> for RichacksSDKError {
    fn from(error: std::io::Error) -> Self {
        RichacksSDKError::IO(error.to_string())
    }
}

impl From<sled::Error> for RichacksSDKError {
    fn from(error: sled::Error) -> Self {
        RichacksSDKError::KvStore(error.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RichacksSDKError>;

/// 远程网关的失败类型
///
/// 每一种都会让 `RichacksSDK` 回退到本地存储，区别只用于日志和测试。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// 未配置访问凭证（设计上的回退触发条件，不是故障）
    #[error("remote credential not configured")]
    CredentialMissing,

    /// 网络不可达、连接被拒绝等
    #[error("transport error: {0}")]
    Transport(String),

    /// 服务端返回非 2xx 状态码
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 响应体不是合法 JSON，或形状不符合预期
    #[error("decode error: {0}")]
    Decode(String),
}

impl RemoteError {
    /// 稳定的分类标签（日志字段）
    pub fn kind(&self) -> &'static str {
        match self {
            RemoteError::CredentialMissing => "credential_missing",
            RemoteError::Transport(_) => "transport",
            RemoteError::Status { .. } => "status",
            RemoteError::Decode(_) => "decode",
        }
    }

    /// 是否属于"未配置"而非真正的故障
    pub fn is_credential_missing(&self) -> bool {
        matches!(self, RemoteError::CredentialMissing)
    }
}

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;
