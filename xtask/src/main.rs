use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace checks for lumen")]
struct Cli {
    #[command(subcommand)]
    command: Task,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    /// fmt, clippy, tests and docs, stopping at the first failure
    Check,
    /// cargo fmt --check
    Fmt,
    /// clippy with warnings denied
    Clippy,
    /// Workspace tests
    Test,
    /// rustdoc for workspace crates only
    Doc,
}

/// One cargo invocation.
struct Step {
    name: &'static str,
    args: &'static [&'static str],
}

const FMT: Step = Step {
    name: "fmt",
    args: &["fmt", "--all", "--", "--check"],
};
const CLIPPY: Step = Step {
    name: "clippy",
    args: &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
};
const TEST: Step = Step {
    name: "test",
    args: &["test", "--workspace"],
};
const DOC: Step = Step {
    name: "doc",
    args: &["doc", "--workspace", "--no-deps"],
};

fn steps(task: Task) -> Vec<&'static Step> {
    match task {
        Task::Check => vec![&FMT, &CLIPPY, &TEST, &DOC],
        Task::Fmt => vec![&FMT],
        Task::Clippy => vec![&CLIPPY],
        Task::Test => vec![&TEST],
        Task::Doc => vec![&DOC],
    }
}

fn run(step: &Step) -> Result<()> {
    println!("==> cargo {}", step.args.join(" "));
    let status = Command::new("cargo")
        .args(step.args)
        .status()
        .with_context(|| format!("failed to spawn cargo for {}", step.name))?;
    if !status.success() {
        bail!("{} failed ({status})", step.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    for step in steps(cli.command) {
        run(step)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_runs_every_step_in_order() {
        let names: Vec<_> = steps(Task::Check).iter().map(|s| s.name).collect();
        assert_eq!(names, ["fmt", "clippy", "test", "doc"]);
    }

    #[test]
    fn single_tasks_run_one_step() {
        for task in [Task::Fmt, Task::Clippy, Task::Test, Task::Doc] {
            assert_eq!(steps(task).len(), 1, "{task:?}");
        }
    }
}
