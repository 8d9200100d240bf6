//! curl config rendering
//!
//! The output is meant for `curl -K <file>` against the hub's local HTTPS
//! API, which uses a self-signed certificate and HTTP/1.1 only.

use crate::error::Result;
use crate::resolver::ResolvedCredential;
use std::fmt;
use std::path::Path;
use tracing::info;

/// curl options carrying the hub credential
#[derive(Clone, PartialEq, Eq)]
pub struct CurlConfig {
    authorization: String,
    user_token: Option<(String, String)>,
}

impl CurlConfig {
    /// Config with the Basic authorization header
    pub fn from_credential(credential: &ResolvedCredential) -> Self {
        Self {
            authorization: credential.authorization(),
            user_token: None,
        }
    }

    /// Also emit the raw `user` and `token` headers
    pub fn with_user_token_headers(mut self, credential: &ResolvedCredential) -> Self {
        self.user_token = Some((credential.user.clone(), credential.token.clone()));
        self
    }

    /// Base64 value of the Basic authorization header
    pub fn authorization(&self) -> &str {
        &self.authorization
    }

    /// Render the config, one option per line
    pub fn render(&self) -> String {
        let mut out = format!("-H \"Authorization: Basic {}\"\n", self.authorization);
        if let Some((user, token)) = &self.user_token {
            out.push_str(&format!("-H \"user: {user}\"\n"));
            out.push_str(&format!("-H \"token: {token}\"\n"));
        }
        out.push_str("--insecure\n");
        out.push_str("--http1.1\n");
        out
    }

    /// Write the config to `path`, readable by the owner only on Unix
    pub fn write_to(&self, path: &Path) -> Result<()> {
        #[cfg(unix)]
        {
            use std::io::Write;
            use std::os::unix::fs::OpenOptionsExt;

            let mut file = std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(path)?;
            file.write_all(self.render().as_bytes())?;
        }
        #[cfg(not(unix))]
        std::fs::write(path, self.render())?;

        info!("Wrote curl config to {}", path.display());
        Ok(())
    }
}

impl fmt::Debug for CurlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurlConfig")
            .field("authorization", &"***")
            .field("user_token_headers", &self.user_token.is_some())
            .finish()
    }
}
