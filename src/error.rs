/// Repository-wide structured errors for the extraction run.
///
/// Every variant here is fatal: it aborts the run and maps to exit code 1.
/// Per-file fetch failures are not represented here — they are collected as
/// `download::ErrorRecord` values and never abort the run.
#[derive(Debug, Clone)]
pub enum ExtractError {
    /// Manifest CSV does not exist at the configured path.
    ManifestNotFound(std::path::PathBuf),
    /// A manifest row carried a non-integer `Internal ID`; keeps the row
    /// number (1-based, counting the header) and the offending value.
    InvalidPatientId { row: usize, value: String },
    /// The patient-id filter matched no manifest rows.
    NoMatchingDocuments,
    /// No SFTP host configured (fresh config.json not yet edited).
    HostNotConfigured,
    /// The interactive password prompt returned an empty credential.
    MissingPassword,
    // SSH / connection related
    SshNoAddress(String),
    SshSessionCreateFailed(String),
    SshHandshakeFailed(String),
    SshAuthFailed(String),
    SftpCreateFailed(String),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use ExtractError::*;
        match self {
            ManifestNotFound(p) => write!(f, "manifest file not found: {}", p.display()),
            InvalidPatientId { row, value } => {
                write!(f, "manifest row {}: invalid Internal ID '{}'", row, value)
            }
            NoMatchingDocuments => {
                write!(f, "no documents found for the configured patient IDs")
            }
            HostNotConfigured => {
                write!(f, "SFTP host is not configured; edit config.json or pass overrides")
            }
            MissingPassword => write!(f, "password required"),
            SshNoAddress(addr) => write!(f, "cannot resolve address: {}", addr),
            SshSessionCreateFailed(addr) => write!(f, "cannot create SSH session: {}", addr),
            SshHandshakeFailed(addr) => write!(f, "SSH handshake failed: {}", addr),
            SshAuthFailed(addr) => write!(f, "SSH authentication failed: {}", addr),
            SftpCreateFailed(msg) => write!(f, "SFTP channel creation failed: {}", msg),
        }
    }
}

impl std::error::Error for ExtractError {}

impl ExtractError {
    /// Whether this error came from the transport/protocol layer rather than
    /// from run setup (manifest, filter, credential). Used by `main` to pick
    /// the user-facing abort message.
    pub fn is_connection_error(&self) -> bool {
        use ExtractError::*;
        matches!(
            self,
            SshNoAddress(_)
                | SshSessionCreateFailed(_)
                | SshHandshakeFailed(_)
                | SftpCreateFailed(_)
        )
    }

    /// Authentication rejections get a dedicated operator hint.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ExtractError::SshAuthFailed(_))
    }
}
