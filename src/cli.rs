use clap::Parser;
use std::path::PathBuf;

use crate::output::report::ReportFormat;
use crate::probe::{FormMethod, ProbeKind};

#[derive(Parser, Debug)]
#[command(
    name = "demi-rs",
    version,
    about = "Multi-protocol credential brute force tool written in Rust"
)]
pub struct Args {
    /// Protocol module to use
    #[arg(short, long, value_enum)]
    pub module: ProbeKind,

    /// Target IP, hostname or URL
    #[arg(short, long)]
    pub target: String,

    /// File with usernames
    #[arg(short = 'U', long)]
    pub userlist: Option<PathBuf>,

    /// File with passwords
    #[arg(short = 'P', long)]
    pub passlist: Option<PathBuf>,

    /// File with user:pass pairs
    #[arg(long, conflicts_with_all = ["userlist", "passlist"])]
    pub pairs: Option<PathBuf>,

    /// Max concurrent workers
    #[arg(long, default_value_t = 32)]
    pub threads: usize,

    /// Per-attempt timeout in seconds
    #[arg(long, default_value_t = 5.0)]
    pub timeout: f64,

    /// Stop after the first valid credential
    #[arg(short = 'f', long)]
    pub stop_on_success: bool,

    /// Random delay between attempts (anti rate-limit jitter)
    #[arg(long)]
    pub random_delay: bool,

    /// Minimum random delay in seconds
    #[arg(long, default_value_t = 0.0)]
    pub min_delay: f64,

    /// Maximum random delay in seconds
    #[arg(long, default_value_t = 0.5)]
    pub max_delay: f64,

    /// Log output to file
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Save valid credentials to file (append-only, one user:pass per line)
    #[arg(long)]
    pub result_file: Option<PathBuf>,

    /// Target port (default depends on the module)
    #[arg(long)]
    pub port: Option<u16>,

    /// URL path (HTTP modules)
    #[arg(long)]
    pub path: Option<String>,

    /// Form username field (http-form)
    #[arg(long)]
    pub user_field: Option<String>,

    /// Form password field (http-form)
    #[arg(long)]
    pub pass_field: Option<String>,

    /// HTTP method (http-form)
    #[arg(long, value_enum, ignore_case = true, default_value_t = FormMethod::Post)]
    pub method: FormMethod,

    /// Success regex (http-form)
    #[arg(long = "success-re")]
    pub success_pattern: Option<String>,

    /// Failure regex (http-form)
    #[arg(long = "fail-re")]
    pub fail_pattern: Option<String>,

    /// HTTP proxy URL (e.g. http://127.0.0.1:8080)
    #[arg(long)]
    pub proxy: Option<String>,

    /// Treat HTTP 403 as successful Basic authentication
    #[arg(long = "http-403-success")]
    pub forbidden_as_success: bool,

    /// Write a run report to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Txt)]
    pub output_format: ReportFormat,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Silent mode (no banner, errors only)
    #[arg(short, long)]
    pub silent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_minimal_ssh_invocation() {
        let args = Args::parse_from(["demi-rs", "-m", "ssh", "-t", "10.0.0.1"]);
        assert_eq!(args.module, ProbeKind::Ssh);
        assert_eq!(args.target, "10.0.0.1");
        assert_eq!(args.threads, 32);
        assert!(!args.stop_on_success);
    }

    #[test]
    fn parses_http_form_options() {
        let args = Args::parse_from([
            "demi-rs",
            "-m",
            "http-form",
            "-t",
            "http://example.com",
            "--path",
            "/login",
            "--user-field",
            "user",
            "--pass-field",
            "pw",
            "--method",
            "GET",
            "--fail-re",
            "bad password",
        ]);
        assert_eq!(args.module, ProbeKind::HttpForm);
        assert_eq!(args.method, FormMethod::Get);
        assert_eq!(args.fail_pattern.as_deref(), Some("bad password"));
    }

    #[test]
    fn pairs_conflicts_with_wordlists() {
        let result = Args::try_parse_from([
            "demi-rs", "-m", "ftp", "-t", "host", "--pairs", "p.txt", "-U", "u.txt",
        ]);
        assert!(result.is_err());
    }
}
