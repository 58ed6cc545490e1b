use std::io;
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::model::{TransferDirection, TransferRequest};
use crate::storage::Settings;
use crate::transfer::{LaunchedProcess, TransferLauncher, spawn_with_combined_output};

pub(crate) const SSH_FAILURE_STATUS: i32 = 255;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SshOptions {
    pub(crate) ssh_program: String,
    pub(crate) scp_program: String,
    pub(crate) connect_timeout: Duration,
    pub(crate) batch_mode: bool,
}

impl SshOptions {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            ssh_program: settings.ssh_program.clone(),
            scp_program: settings.scp_program.clone(),
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs.max(1)),
            batch_mode: settings.batch_mode,
        }
    }

    fn common_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if self.batch_mode {
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }
        args.push("-o".to_string());
        args.push(format!("ConnectTimeout={}", self.connect_timeout.as_secs()));
        args
    }
}

impl Default for SshOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RemoteOutput {
    pub(crate) stdout: String,
    pub(crate) stderr: String,
    pub(crate) status: Option<i32>,
}

impl RemoteOutput {
    pub(crate) fn connection_failed(&self) -> bool {
        self.status == Some(SSH_FAILURE_STATUS)
    }

    pub(crate) fn first_line(&self) -> Option<&str> {
        self.stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }

    pub(crate) fn failure_message(&self, host: &str) -> String {
        let detail = self
            .stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty());
        match detail {
            Some(detail) => format!("{host}: {detail}"),
            None => host.to_string(),
        }
    }
}

pub(crate) trait RemoteShell: Send + Sync {
    fn run(&self, host: &str, command: &str) -> io::Result<RemoteOutput>;
}

#[derive(Debug, Default)]
pub(crate) struct SshShell {
    options: SshOptions,
}

impl SshShell {
    pub(crate) fn new(options: SshOptions) -> Self {
        Self { options }
    }
}

impl RemoteShell for SshShell {
    fn run(&self, host: &str, command: &str) -> io::Result<RemoteOutput> {
        let output = Command::new(&self.options.ssh_program)
            .args(self.options.common_args())
            .arg(host)
            .arg(command)
            .stdin(Stdio::null())
            .output()?;
        Ok(RemoteOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
        })
    }
}

#[derive(Debug, Default)]
pub(crate) struct ScpLauncher {
    options: SshOptions,
}

impl ScpLauncher {
    pub(crate) fn new(options: SshOptions) -> Self {
        Self { options }
    }

    pub(crate) fn command_args(&self, request: &TransferRequest) -> Vec<String> {
        let (source, destination) = match request.direction {
            TransferDirection::Upload => (
                request.source.clone(),
                format!("{}:{}", request.host, request.destination),
            ),
            TransferDirection::Download => (
                format!("{}:{}", request.host, request.source),
                request.destination.clone(),
            ),
        };
        let mut args = vec!["-v".to_string(), "-p".to_string()];
        args.extend(self.options.common_args());
        args.push(source);
        args.push(destination);
        args
    }
}

impl TransferLauncher for ScpLauncher {
    fn launch(&self, request: &TransferRequest) -> io::Result<LaunchedProcess> {
        let mut command = Command::new(&self.options.scp_program);
        command.args(self.command_args(request));
        spawn_with_combined_output(command)
    }
}

pub(crate) fn shell_quote(value: &str) -> String {
    if value.is_empty() {
        return "''".to_string();
    }
    format!("'{}'", value.replace('\'', "'\\''"))
}

#[cfg(test)]
pub(crate) use mock::MockShell;

#[cfg(test)]
mod mock {
    use std::io;
    use std::sync::Mutex;

    use super::{RemoteOutput, RemoteShell, SSH_FAILURE_STATUS};

    #[derive(Default)]
    pub(crate) struct MockShell {
        rules: Mutex<Vec<(String, Result<RemoteOutput, String>)>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockShell {
        pub(crate) fn respond(&self, needle: &str, stdout: &str) {
            self.respond_with_status(needle, stdout, 0);
        }

        pub(crate) fn respond_with_status(&self, needle: &str, stdout: &str, status: i32) {
            self.rules.lock().unwrap().push((
                needle.to_string(),
                Ok(RemoteOutput {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    status: Some(status),
                }),
            ));
        }

        pub(crate) fn fail(&self, needle: &str, message: &str) {
            self.rules
                .lock()
                .unwrap()
                .push((needle.to_string(), Err(message.to_string())));
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl RemoteShell for MockShell {
        fn run(&self, _host: &str, command: &str) -> io::Result<RemoteOutput> {
            self.calls.lock().unwrap().push(command.to_string());
            let rules = self.rules.lock().unwrap();
            match rules.iter().find(|(needle, _)| command.contains(needle.as_str())) {
                Some((_, Ok(output))) => Ok(output.clone()),
                Some((_, Err(message))) => Err(io::Error::other(message.clone())),
                None => Ok(RemoteOutput {
                    stdout: String::new(),
                    stderr: "ssh: connect to host: Connection refused".to_string(),
                    status: Some(SSH_FAILURE_STATUS),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(direction: TransferDirection) -> TransferRequest {
        TransferRequest {
            source: "/src/a file.txt".to_string(),
            destination: "/dst/a file.txt".to_string(),
            host: "box".to_string(),
            direction,
        }
    }

    #[test]
    fn shell_quote_escapes_single_quotes() {
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("/tmp/plain"), "'/tmp/plain'");
        assert_eq!(shell_quote("it's"), "'it'\\''s'");
    }

    #[test]
    fn scp_args_put_host_on_remote_side() {
        let launcher = ScpLauncher::new(SshOptions::default());
        let upload = launcher.command_args(&request(TransferDirection::Upload));
        assert_eq!(upload[0], "-v");
        assert_eq!(upload[1], "-p");
        assert_eq!(upload[upload.len() - 2], "/src/a file.txt");
        assert_eq!(upload[upload.len() - 1], "box:/dst/a file.txt");

        let download = launcher.command_args(&request(TransferDirection::Download));
        assert_eq!(download[download.len() - 2], "box:/src/a file.txt");
        assert_eq!(download[download.len() - 1], "/dst/a file.txt");
    }

    #[test]
    fn common_args_follow_options() {
        let mut options = SshOptions::default();
        options.batch_mode = false;
        options.connect_timeout = Duration::from_secs(3);
        assert_eq!(options.common_args(), vec!["-o", "ConnectTimeout=3"]);
        options.batch_mode = true;
        assert!(options.common_args().contains(&"BatchMode=yes".to_string()));
    }

    #[test]
    fn remote_output_helpers() {
        let output = RemoteOutput {
            stdout: "\n  /home/alice \nignored\n".to_string(),
            stderr: "warning\nssh: Could not resolve hostname box\n".to_string(),
            status: Some(SSH_FAILURE_STATUS),
        };
        assert!(output.connection_failed());
        assert_eq!(output.first_line(), Some("/home/alice"));
        assert_eq!(
            output.failure_message("box"),
            "box: ssh: Could not resolve hostname box"
        );
    }

    #[test]
    fn mock_shell_matches_first_rule() {
        let shell = MockShell::default();
        shell.respond("echo $HOME", "/home/bob\n");
        let output = shell.run("box", "echo $HOME").unwrap();
        assert_eq!(output.first_line(), Some("/home/bob"));
        let unknown = shell.run("box", "whoami").unwrap();
        assert!(unknown.connection_failed());
        assert_eq!(shell.calls().len(), 2);
    }
}
