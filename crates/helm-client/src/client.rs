//! Helm CLI client

use crate::error::HelmError;
use crate::runner::{CmdRunner, CommandOutput, DefaultRunner};
use tracing::{error, info};

/// Installs and inspects chart releases
#[async_trait::async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Upgrade `release` to the chart in `chart_dir`
    ///
    /// When `overrides_file` is given the values used at install time are
    /// reused and the file is layered on top.
    async fn upgrade(
        &self,
        release: &str,
        namespace: &str,
        chart_dir: &str,
        overrides_file: Option<&str>,
    ) -> Result<CommandOutput, HelmError>;

    /// True when `release` is installed in `namespace`
    async fn is_installed(&self, release: &str, namespace: &str) -> Result<bool, HelmError>;
}

/// `PackageInstaller` shelling out to the `helm` binary
pub struct HelmClient {
    runner: Box<dyn CmdRunner>,
    helm_path: String,
}

impl Default for HelmClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HelmClient {
    /// Client running `helm` from `PATH`
    pub fn new() -> Self {
        Self::with_runner(DefaultRunner)
    }

    /// Client executing commands through `runner`
    pub fn with_runner(runner: impl CmdRunner + 'static) -> Self {
        Self {
            runner: Box::new(runner),
            helm_path: "helm".to_string(),
        }
    }

    /// Use a helm binary at a specific path
    pub fn helm_path(mut self, path: impl Into<String>) -> Self {
        self.helm_path = path.into();
        self
    }

    pub(crate) fn upgrade_args(
        release: &str,
        namespace: &str,
        chart_dir: &str,
        overrides_file: Option<&str>,
    ) -> Vec<String> {
        let mut args = vec!["upgrade".to_string(), release.to_string(), chart_dir.to_string()];
        if !namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(namespace.to_string());
        }
        if let Some(file) = overrides_file.filter(|f| !f.is_empty()) {
            args.push("--reuse-values".to_string());
            args.push("-f".to_string());
            args.push(file.to_string());
        }
        args
    }

    pub(crate) fn status_args(release: &str, namespace: &str) -> Vec<String> {
        let mut args = vec!["status".to_string(), release.to_string()];
        if !namespace.is_empty() {
            args.push("--namespace".to_string());
            args.push(namespace.to_string());
        }
        args
    }
}

#[async_trait::async_trait]
impl PackageInstaller for HelmClient {
    async fn upgrade(
        &self,
        release: &str,
        namespace: &str,
        chart_dir: &str,
        overrides_file: Option<&str>,
    ) -> Result<CommandOutput, HelmError> {
        if release.is_empty() {
            return Err(HelmError::InvalidRequest("release name must not be empty".to_string()));
        }

        let args = Self::upgrade_args(release, namespace, chart_dir, overrides_file);
        let output = self.runner.run(&self.helm_path, &args).await?;
        if !output.success() {
            error!("helm upgrade for release {} failed with stderr: {}", release, output.stderr);
            return Err(HelmError::CommandFailed {
                command: format!("{} {}", self.helm_path, args.join(" ")),
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        info!("helm upgrade for release {} succeeded with stdout: {}", release, output.stdout);
        Ok(output)
    }

    async fn is_installed(&self, release: &str, namespace: &str) -> Result<bool, HelmError> {
        let args = Self::status_args(release, namespace);
        let output = self.runner.run(&self.helm_path, &args).await?;
        if output.success() {
            return Ok(true);
        }
        if output.stderr.contains("not found") {
            return Ok(false);
        }

        error!("helm status for release {} failed with stderr: {}", release, output.stderr);
        Err(HelmError::CommandFailed {
            command: format!("{} {}", self.helm_path, args.join(" ")),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
