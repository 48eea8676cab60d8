use crate::timeout::{timeout_for, ExecutionMode};
use coder_core::Operator;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything `build_command` needs:
/// `build_command(prompt, repo_root, file_paths, model, task_type,
/// session_id?, continue_last?)`.
pub struct CommandInput<'a> {
    pub prompt: &'a str,
    pub repo_root: &'a Path,
    pub file_paths: &'a [String],
    pub model: Option<&'a str>,
    pub mode: ExecutionMode,
    pub session_id: Option<&'a str>,
    pub continue_last: bool,
    /// `NINJA_CODE_BIN`-style override of the operator binary name.
    pub bin_override: Option<&'a str>,
    /// Extra environment (credentials, etc.) to merge into the child.
    pub extra_env: &'a [(String, String)],
}

/// Everything `coder-process::CommandSpec` needs, plus the metadata the
/// spec says `build_command` returns for diagnostics/logging.
#[derive(Debug, Clone)]
pub struct BuiltCommand {
    /// `argv[0]` is the program; the rest are its arguments.
    pub argv: Vec<String>,
    pub env: Vec<(String, String)>,
    pub working_dir: PathBuf,
    pub timeout_seconds: u64,
    pub metadata: BTreeMap<String, String>,
}

impl BuiltCommand {
    pub fn into_command_spec(self) -> coder_process::CommandSpec {
        let mut argv = self.argv.into_iter();
        let program = argv.next().unwrap_or_default();
        coder_process::CommandSpec {
            program,
            args: argv.collect(),
            env: self.env,
            working_dir: self.working_dir,
            timeout: std::time::Duration::from_secs(self.timeout_seconds),
        }
    }
}

/// `opencode run` wants model names prefixed with a provider tag; if the
/// caller's model string has no `/`, default it under `openrouter/`.
fn prefixed_model(model: Option<&str>) -> Option<String> {
    model.map(|m| {
        if m.contains('/') {
            m.to_string()
        } else {
            format!("openrouter/{m}")
        }
    })
}

pub(crate) fn build(operator: Operator, input: &CommandInput<'_>) -> BuiltCommand {
    let bin = input
        .bin_override
        .map(str::to_string)
        .unwrap_or_else(|| operator.as_str().to_string());
    let timeout_seconds = timeout_for(operator, input.mode).as_secs();
    let mut metadata = BTreeMap::new();
    metadata.insert("operator".to_string(), operator.as_str().to_string());
    metadata.insert("mode".to_string(), format!("{:?}", input.mode));

    let argv = match operator {
        Operator::Aider => build_aider(&bin, input),
        Operator::Opencode => build_opencode(&bin, input),
        Operator::Gemini => build_gemini(&bin, input),
        Operator::Claude => build_claude(&bin, input),
    };

    BuiltCommand {
        argv,
        env: input.extra_env.to_vec(),
        working_dir: input.repo_root.to_path_buf(),
        timeout_seconds,
        metadata,
    }
}

fn build_aider(bin: &str, input: &CommandInput<'_>) -> Vec<String> {
    let mut argv = vec![
        bin.to_string(),
        "--message".to_string(),
        input.prompt.to_string(),
        "--yes".to_string(),
    ];
    if let Some(model) = input.model {
        argv.push("--model".to_string());
        argv.push(model.to_string());
    }
    argv.extend(input.file_paths.iter().cloned());
    argv
}

fn build_opencode(bin: &str, input: &CommandInput<'_>) -> Vec<String> {
    let mut argv = vec![bin.to_string(), "run".to_string()];
    if let Some(model) = prefixed_model(input.model) {
        argv.push("--model".to_string());
        argv.push(model);
    }
    if input.continue_last {
        if let Some(session_id) = input.session_id {
            argv.push("--continue".to_string());
            argv.push(session_id.to_string());
        }
    }
    for file in input.file_paths {
        argv.push("--file".to_string());
        argv.push(file.clone());
    }
    argv.push(input.prompt.to_string());
    argv
}

fn build_gemini(bin: &str, input: &CommandInput<'_>) -> Vec<String> {
    let mut argv = vec![bin.to_string(), "--prompt".to_string(), input.prompt.to_string()];
    for file in input.file_paths {
        argv.push("--file".to_string());
        argv.push(file.clone());
    }
    argv
}

fn build_claude(bin: &str, input: &CommandInput<'_>) -> Vec<String> {
    vec![bin.to_string(), "--print".to_string(), input.prompt.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(mode: ExecutionMode) -> CommandInput<'a> {
        CommandInput {
            prompt: "do the thing",
            repo_root: Path::new("/tmp/repo"),
            file_paths: &[],
            model: None,
            mode,
            session_id: None,
            continue_last: false,
            bin_override: None,
            extra_env: &[],
        }
    }

    #[test]
    fn aider_uses_message_and_yes_flags() {
        let built = build(Operator::Aider, &input(ExecutionMode::Quick));
        assert_eq!(built.argv[0], "aider");
        assert!(built.argv.contains(&"--message".to_string()));
        assert!(built.argv.contains(&"--yes".to_string()));
        assert_eq!(built.timeout_seconds, 300);
    }

    #[test]
    fn opencode_prefixes_bare_model_name() {
        let mut i = input(ExecutionMode::Sequential);
        i.model = Some("gpt-5");
        let built = build(Operator::Opencode, &i);
        let model_idx = built.argv.iter().position(|a| a == "--model").unwrap();
        assert_eq!(built.argv[model_idx + 1], "openrouter/gpt-5");
    }

    #[test]
    fn opencode_keeps_fully_qualified_model_name() {
        let mut i = input(ExecutionMode::Sequential);
        i.model = Some("anthropic/claude-sonnet");
        let built = build(Operator::Opencode, &i);
        let model_idx = built.argv.iter().position(|a| a == "--model").unwrap();
        assert_eq!(built.argv[model_idx + 1], "anthropic/claude-sonnet");
    }

    #[test]
    fn opencode_continue_requires_both_flag_and_session_id() {
        let mut i = input(ExecutionMode::Sequential);
        i.continue_last = true;
        i.session_id = Some("sess-1");
        let built = build(Operator::Opencode, &i);
        assert!(built.argv.contains(&"--continue".to_string()));
        assert!(built.argv.contains(&"sess-1".to_string()));
    }

    #[test]
    fn claude_uses_print_flag_only() {
        let built = build(Operator::Claude, &input(ExecutionMode::Quick));
        assert_eq!(built.argv, vec!["claude", "--print", "do the thing"]);
    }

    #[test]
    fn gemini_appends_file_flags() {
        let mut i = input(ExecutionMode::Quick);
        let files = vec!["a.rs".to_string(), "b.rs".to_string()];
        i.file_paths = &files;
        let built = build(Operator::Gemini, &i);
        assert_eq!(
            built.argv,
            vec!["gemini", "--prompt", "do the thing", "--file", "a.rs", "--file", "b.rs"]
        );
    }

    #[test]
    fn bin_override_replaces_default_executable() {
        let mut i = input(ExecutionMode::Quick);
        i.bin_override = Some("/custom/aider-fork");
        let built = build(Operator::Aider, &i);
        assert_eq!(built.argv[0], "/custom/aider-fork");
    }
}
