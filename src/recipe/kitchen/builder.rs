// src/recipe/kitchen/builder.rs

//! External build tool invocation

use crate::error::{Error, Result};
use crate::platform::BuildType;
use crate::recipe::variables::BuildVariableSet;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};

/// Trait for the external builder
///
/// Each phase returns the tool's combined output for the build log.
pub trait BuildTool: Send + Sync {
    /// Generate the build system for `source_dir` in `build_dir`
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        variables: &BuildVariableSet,
    ) -> Result<String>;

    /// Compile everything in `build_dir`
    fn build(&self, build_dir: &Path, build_type: BuildType, jobs: u32) -> Result<String>;

    /// Install the build results under `prefix`
    fn install(&self, build_dir: &Path, build_type: BuildType, prefix: &Path) -> Result<String>;
}

/// Runs the `cmake` executable
pub struct CmakeBuilder {
    program: PathBuf,
}

impl CmakeBuilder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of the configure step
    pub fn configure_args(
        source_dir: &Path,
        build_dir: &Path,
        variables: &BuildVariableSet,
    ) -> Vec<String> {
        let mut args = vec![
            "-S".to_string(),
            source_dir.display().to_string(),
            "-B".to_string(),
            build_dir.display().to_string(),
        ];
        args.extend(variables.to_cmake_args());
        args
    }

    fn run(&self, phase: &str, args: &[String]) -> Result<String> {
        debug!("{} {}", self.program.display(), args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::ExternalBuildFailure {
                phase: phase.to_string(),
                reason: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(Error::ExternalBuildFailure {
                phase: phase.to_string(),
                reason: format!("exit code {:?}\nstderr: {}", output.status.code(), stderr),
            });
        }

        let mut log = format!("=== {} ===\n", phase);
        for stream in [stdout.as_ref(), stderr.as_ref()] {
            if !stream.is_empty() {
                log.push_str(stream);
                log.push('\n');
            }
        }
        Ok(log)
    }
}

impl Default for CmakeBuilder {
    fn default() -> Self {
        Self::new("cmake")
    }
}

impl BuildTool for CmakeBuilder {
    fn configure(
        &self,
        source_dir: &Path,
        build_dir: &Path,
        variables: &BuildVariableSet,
    ) -> Result<String> {
        info!("Configuring {}", source_dir.display());
        let args = Self::configure_args(source_dir, build_dir, variables);
        self.run("configure", &args)
    }

    fn build(&self, build_dir: &Path, build_type: BuildType, jobs: u32) -> Result<String> {
        info!("Building with {} jobs", jobs);
        let args = vec![
            "--build".to_string(),
            build_dir.display().to_string(),
            "--config".to_string(),
            build_type.to_string(),
            "--parallel".to_string(),
            jobs.max(1).to_string(),
        ];
        self.run("build", &args)
    }

    fn install(&self, build_dir: &Path, build_type: BuildType, prefix: &Path) -> Result<String> {
        info!("Installing into {}", prefix.display());
        let args = vec![
            "--install".to_string(),
            build_dir.display().to_string(),
            "--config".to_string(),
            build_type.to_string(),
            "--prefix".to_string(),
            prefix.display().to_string(),
        ];
        self.run("install", &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configure_args() {
        let mut vars = BuildVariableSet::new();
        vars.set("BUILD_SHARED_LIBS", false);
        vars.set_cache("CMAKE_POLICY_DEFAULT_CMP0042", "NEW");

        let args = CmakeBuilder::configure_args(Path::new("/src"), Path::new("/build"), &vars);
        assert_eq!(
            args,
            vec![
                "-S",
                "/src",
                "-B",
                "/build",
                "-DBUILD_SHARED_LIBS=OFF",
                "-DCMAKE_POLICY_DEFAULT_CMP0042=NEW"
            ]
        );
    }

    #[test]
    fn test_missing_program_is_build_failure() {
        let builder = CmakeBuilder::new("/nonexistent/cmake-for-tests");
        let err = builder
            .build(Path::new("/tmp"), BuildType::Release, 1)
            .unwrap_err();
        match err {
            Error::ExternalBuildFailure { phase, .. } => assert_eq!(phase, "build"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
