//! Install command implementation.

use std::path::PathBuf;

use clap::Subcommand;
use miette::{Result, miette};
use plugbay_core::{DebugInfo, InstallPayload, InstallStep, PluginCategory};

use super::Context;
use crate::output;

/// Where to install a plugin from.
#[derive(Debug, Subcommand)]
pub enum InstallTarget {
    /// Install a marketplace artifact (author/name:version[@checksum])
    Marketplace {
        identifier: String,
    },

    /// Install a release asset from a GitHub repository
    Github {
        /// Repository URL or owner/repo
        repo: String,

        /// Release tag
        #[arg(long)]
        version: String,

        /// Asset file name
        #[arg(long)]
        package: String,
    },

    /// Install a package file
    Local {
        file: PathBuf,
    },

    /// Attach a plugin served by a debug session (author/name@version)
    Debug {
        plugin: String,

        #[arg(long)]
        key: String,

        #[arg(long, default_value = "localhost")]
        host: String,

        #[arg(long, default_value_t = 5003)]
        port: u16,

        /// Category to list the plugin under (tool, model, extension)
        #[arg(long, default_value = "tool")]
        category: PluginCategory,
    },
}

impl InstallTarget {
    /// Builds the payload, parsing identifiers typed by the user.
    pub fn into_payload(self) -> Result<InstallPayload> {
        Ok(match self {
            Self::Marketplace { identifier } => InstallPayload::Marketplace {
                identifier: plugbay_parser::parse_unique_identifier(&identifier)
                    .map_err(miette::Report::new)?,
            },
            Self::Github {
                repo,
                version,
                package,
            } => InstallPayload::GitHub {
                repo_url: repo,
                version,
                package,
            },
            Self::Local { file } => InstallPayload::Local { file },
            Self::Debug {
                plugin,
                key,
                host,
                port,
                category,
            } => {
                let reference =
                    plugbay_parser::parse_marketplace_ref(&plugin).map_err(miette::Report::new)?;
                InstallPayload::Debugging {
                    identity: reference.identity_or("0.0.0"),
                    category,
                    session: DebugInfo { key, host, port },
                }
            }
        })
    }
}

/// Installs a plugin, stopping at ready-to-install on a dry run.
pub async fn execute(ctx: &Context, target: InstallTarget, dry_run: bool) -> Result<()> {
    let payload = target.into_payload()?;
    let source = payload.source();

    let mut session = ctx
        .manager
        .start_install(source, payload)
        .map_err(|e| miette!("{}", e))?;

    if session.step() == InstallStep::Uploading {
        let spinner = output::create_spinner("Uploading package...");
        session.upload().await.map_err(|e| miette!("{}", e))?;

        if session.step() == InstallStep::UploadFailed {
            let message = session.error_message().unwrap_or("upload failed").to_string();
            output::spinner_failure(&spinner, "Upload failed");
            return Err(miette!("{}", message));
        }

        let uploaded = session
            .package()
            .map(|p| p.unique_identifier.clone())
            .unwrap_or_default();
        output::spinner_success(&spinner, &format!("Uploaded {uploaded}"));
    }

    if dry_run {
        let state = session.cancel().map_err(|e| miette!("{}", e))?;
        output::info(&format!("Dry run: stopped at ready to install ({})", state.step));
        return Ok(());
    }

    let spinner = output::create_spinner(&format!("Installing from {source}..."));
    let step = session.confirm_install().await.map_err(|e| miette!("{}", e))?;

    match step {
        InstallStep::Installed => {
            let task = session.task_id().unwrap_or("-");
            output::spinner_success(&spinner, &format!("Installed (task {task})"));
            Ok(())
        }
        _ => {
            output::spinner_failure(&spinner, "Install failed");
            Err(miette!(
                "{}",
                session.error_message().unwrap_or("install failed")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugbay_core::InstallSource;

    #[test]
    fn test_marketplace_identifier_is_parsed() {
        let payload = InstallTarget::Marketplace {
            identifier: "acme/weather:1.0.0@abc".to_string(),
        }
        .into_payload()
        .unwrap();

        match payload {
            InstallPayload::Marketplace { identifier } => {
                assert_eq!(identifier.plugin_id(), "acme/weather");
                assert_eq!(identifier.checksum.as_deref(), Some("abc"));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_bad_identifier_is_reported() {
        let result = InstallTarget::Marketplace {
            identifier: "acme/weather".to_string(),
        }
        .into_payload();
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_target_defaults_version() {
        let payload = InstallTarget::Debug {
            plugin: "acme/weather".to_string(),
            key: "k".to_string(),
            host: "localhost".to_string(),
            port: 5003,
            category: PluginCategory::Extension,
        }
        .into_payload()
        .unwrap();

        assert_eq!(payload.source(), InstallSource::Debugging);
        match payload {
            InstallPayload::Debugging {
                identity, category, ..
            } => {
                assert_eq!(identity.version, "0.0.0");
                assert_eq!(category, PluginCategory::Extension);
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }
}
