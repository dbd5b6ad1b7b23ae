// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The worker agent's terminal command grammar (§4.7): a proof-gated
//! mini-grammar the worker's free-text output must end with before the
//! autopilot will trust its verdict.

use crate::error::ContractViolation;

const EXCERPT_MAX_CHARS: usize = 280;

const CONCRETE_EXECUTION_MARKERS: [&str; 11] = [
    "executed",
    "ran",
    "tool call",
    "command:",
    "key result",
    "changed files:",
    "updated ",
    "created ",
    "patched ",
    "edited ",
    "test",
];

const EXECUTION_NEGATIONS: [&str; 5] = [
    "changed files: none",
    "no execution",
    "did not execute",
    "no concrete step",
    "no change",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommandKind {
    Continue,
    Blocked,
    Completed,
}

impl WorkerCommandKind {
    fn required_flag(self) -> &'static str {
        match self {
            WorkerCommandKind::Continue | WorkerCommandKind::Blocked => "--text",
            WorkerCommandKind::Completed => "--result",
        }
    }

    fn from_verb(verb: &str) -> Option<Self> {
        match verb {
            "continue" => Some(WorkerCommandKind::Continue),
            "blocked" => Some(WorkerCommandKind::Blocked),
            "completed" => Some(WorkerCommandKind::Completed),
            _ => None,
        }
    }
}

/// A parsed `kanban-workflow <verb> --text|--result "<value>"` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    pub kind: WorkerCommandKind,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvidenceInfo {
    pub present: bool,
    pub has_concrete_execution: bool,
    pub excerpt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub ok: bool,
    pub command: Option<WorkerCommand>,
    pub violations: Vec<ContractViolation>,
    pub evidence: EvidenceInfo,
}

/// Validates a worker's free-text response against the §4.7 grammar: a
/// single terminal command on the last non-empty line, preceded by a
/// non-empty `EVIDENCE` section with (for `continue`) a concrete execution
/// signal and no explicit negation.
pub fn validate_worker_response_contract(text: &str) -> ValidationResult {
    let lines: Vec<&str> = text.lines().collect();
    let non_empty_indices: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    let candidate_indices: Vec<usize> = non_empty_indices
        .iter()
        .copied()
        .filter(|&i| lines[i].trim().to_lowercase().starts_with("kanban-workflow "))
        .collect();

    let mut violations = Vec::new();

    let terminal_idx = match candidate_indices.len() {
        0 => {
            violations.push(ContractViolation::NoTerminalCommand);
            None
        }
        1 => {
            let idx = candidate_indices[0];
            if non_empty_indices.last().copied() != Some(idx) {
                violations.push(ContractViolation::TerminalCommandNotLastLine);
            }
            Some(idx)
        }
        _ => {
            violations.push(ContractViolation::MultipleTerminalCandidates);
            None
        }
    };

    let command = terminal_idx.and_then(|idx| parse_command_line(lines[idx].trim(), &mut violations));

    let evidence = terminal_idx
        .map(|idx| evaluate_evidence(&lines[..idx], command.as_ref(), &mut violations))
        .unwrap_or_default();

    let ok = violations.is_empty() && command.is_some();

    if !ok {
        tracing::warn!(target: "kwf_engine::contract", ?violations, "worker response failed contract validation");
    }

    ValidationResult {
        ok,
        command,
        violations,
        evidence,
    }
}

/// Convenience accessor used by callers (and the soundness property) that
/// only care whether a structurally valid command is present.
pub fn extract_worker_terminal_command(text: &str) -> Option<WorkerCommand> {
    validate_worker_response_contract(text).command
}

fn parse_command_line(line: &str, violations: &mut Vec<ContractViolation>) -> Option<WorkerCommand> {
    let tokens = tokenize_shell_words(line);
    if tokens.len() < 4 {
        violations.push(ContractViolation::TooFewTokens);
        return None;
    }

    let verb_token = tokens[1].to_lowercase();
    let Some(kind) = WorkerCommandKind::from_verb(&verb_token) else {
        violations.push(ContractViolation::UnknownVerb { verb: verb_token });
        return None;
    };

    let required_flag = kind.required_flag();
    if tokens[2] != required_flag {
        violations.push(ContractViolation::MissingRequiredFlag {
            verb: verb_token,
            flag: required_flag,
        });
        return None;
    }

    let value = tokens[3].trim();
    if value.is_empty() {
        violations.push(ContractViolation::EmptyFlagValue { flag: required_flag });
        return None;
    }

    Some(WorkerCommand {
        kind,
        text: value.to_string(),
    })
}

fn evaluate_evidence(
    preceding_lines: &[&str],
    command: Option<&WorkerCommand>,
    violations: &mut Vec<ContractViolation>,
) -> EvidenceInfo {
    let header_idx = preceding_lines
        .iter()
        .rposition(|l| is_evidence_header(l.trim()));

    let Some(header_idx) = header_idx else {
        violations.push(ContractViolation::MissingEvidenceSection);
        return EvidenceInfo::default();
    };

    let body_lines = &preceding_lines[header_idx + 1..];
    let body = body_lines.join("\n");
    let trimmed = body.trim();
    if trimmed.is_empty() {
        violations.push(ContractViolation::EmptyEvidenceSection);
        return EvidenceInfo {
            present: false,
            has_concrete_execution: false,
            excerpt: String::new(),
        };
    }

    let lowered = trimmed.to_lowercase();
    let negated = EXECUTION_NEGATIONS.iter().any(|n| lowered.contains(n));
    let has_marker = CONCRETE_EXECUTION_MARKERS.iter().any(|m| lowered.contains(m));
    let has_concrete_execution = has_marker && !negated;

    if let Some(cmd) = command {
        if cmd.kind == WorkerCommandKind::Continue {
            if negated {
                violations.push(ContractViolation::EvidenceNegatesExecution);
            } else if !has_marker {
                violations.push(ContractViolation::EvidenceLacksConcreteExecution);
            }
        }
    }

    EvidenceInfo {
        present: true,
        has_concrete_execution,
        excerpt: truncate_excerpt(trimmed),
    }
}

fn is_evidence_header(line: &str) -> bool {
    let lowered = line.to_lowercase();
    lowered == "evidence" || lowered == "evidence:"
}

fn truncate_excerpt(text: &str) -> String {
    if text.chars().count() <= EXCERPT_MAX_CHARS {
        return text.to_string();
    }
    text.chars().take(EXCERPT_MAX_CHARS).collect()
}

/// POSIX-lite shell-word tokenizer (§4.7): single/double quotes group,
/// backslash escapes `\n`/`\t`/`\r` (otherwise literal next char), and
/// `&&`/`||`/`;` outside quotes terminate the command with the tail ignored.
fn tokenize_shell_words(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut token_active = false;
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\'' => {
                token_active = true;
                i += 1;
                while i < chars.len() && chars[i] != '\'' {
                    current.push(chars[i]);
                    i += 1;
                }
                i += 1;
            }
            '"' => {
                token_active = true;
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' && i + 1 < chars.len() {
                        current.push(escape_char(chars[i + 1]));
                        i += 2;
                    } else {
                        current.push(chars[i]);
                        i += 1;
                    }
                }
                i += 1;
            }
            '\\' if i + 1 < chars.len() => {
                token_active = true;
                current.push(escape_char(chars[i + 1]));
                i += 2;
            }
            ';' => break,
            '&' if chars.get(i + 1) == Some(&'&') => break,
            '|' if chars.get(i + 1) == Some(&'|') => break,
            c if c.is_whitespace() => {
                if token_active {
                    tokens.push(std::mem::take(&mut current));
                    token_active = false;
                }
                i += 1;
            }
            c => {
                token_active = true;
                current.push(c);
                i += 1;
            }
        }
    }

    if token_active {
        tokens.push(current);
    }
    tokens
}

fn escape_char(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        other => other,
    }
}

#[cfg(test)]
#[path = "contract_tests.rs"]
mod tests;
