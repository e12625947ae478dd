//! Field-by-field decoding of a plan document into the typed plan model
//!
//! Every problem is appended to the decoder's error list and decoding keeps
//! going, so one pass over a document reports all of its structural problems.

use serde_yaml::{Mapping, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::time::Duration;

use super::dependencies::{validate_dependencies, validate_gate_references, DependencyEntry};
use crate::plan::schema::{
    AgentInput, AgentKind, ExecutionStrategy, GateKind, GateSettings, Plan, PlanMetadata,
    QualityGateConfig, RetryPolicy, Task, TaskAction, TaskKind, ValidationError,
    ValidationErrorKind, ValidationWarning,
};

/// Result of decoding a document
pub(super) struct DecodeOutcome {
    /// Best-effort plan; only meaningful when `errors` is empty
    pub plan: Option<Plan>,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Lower bound enforced on a seconds field
#[derive(Clone, Copy)]
enum Bound {
    Positive,
    NonNegative,
}

/// A task identifier and its dependencies, kept even when the rest of the
/// task failed to decode so dependency checks do not report phantom errors
struct TaskHead {
    path: String,
    id: String,
    depends_on: Vec<String>,
}

#[derive(Default)]
pub(super) struct Decoder {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Decoder {
    pub(super) fn decode(mut self, document: &Value) -> DecodeOutcome {
        let plan = match document {
            Value::Mapping(root) => self.decode_root(root),
            Value::Null => {
                self.error(
                    ValidationErrorKind::MissingField,
                    "$",
                    "plan document is empty",
                );
                None
            }
            other => {
                self.error(
                    ValidationErrorKind::WrongType,
                    "$",
                    format!(
                        "expected a mapping at the top level, found {}",
                        type_name(other)
                    ),
                );
                None
            }
        };

        DecodeOutcome {
            plan,
            errors: self.errors,
            warnings: self.warnings,
        }
    }

    fn decode_root(&mut self, root: &Mapping) -> Option<Plan> {
        let metadata = self.decode_metadata(root);

        let task_items = self.sequence(root, "tasks", "");
        let (tasks, heads) = self.decode_tasks(task_items);

        let gate_items = self.sequence(root, "qualityGates", "");
        let (gates, gate_refs) = self.decode_gates(gate_items);

        let entries: Vec<DependencyEntry<'_>> = heads
            .iter()
            .map(|head| DependencyEntry {
                path: head.path.clone(),
                id: &head.id,
                depends_on: &head.depends_on,
            })
            .collect();
        self.errors.extend(validate_dependencies(&entries));

        let known: Vec<&str> = heads.iter().map(|h| h.id.as_str()).collect();
        self.errors.extend(validate_gate_references(
            gate_refs
                .iter()
                .map(|(path, id)| (path.clone(), id.as_str())),
            &known,
        ));

        metadata.map(|metadata| Plan {
            metadata,
            tasks,
            quality_gates: gates,
        })
    }

    fn decode_metadata(&mut self, root: &Mapping) -> Option<PlanMetadata> {
        let map = match root.get("metadata") {
            None | Some(Value::Null) => {
                self.error(
                    ValidationErrorKind::MissingField,
                    "metadata",
                    "required field 'metadata' is missing",
                );
                return None;
            }
            Some(Value::Mapping(map)) => map,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    "metadata",
                    format!("expected a mapping, found {}", type_name(other)),
                );
                return None;
            }
        };

        let id = self.required_str(map, "id", "metadata");
        let name = self.required_str(map, "name", "metadata");
        let version = self.required_str(map, "version", "metadata");

        if let Some(version) = &version {
            if semver::Version::parse(version.trim()).is_err() {
                self.warn(
                    "metadata.version",
                    format!(
                        "version '{version}' is not a semantic version (expected MAJOR.MINOR.PATCH)"
                    ),
                );
            }
        }

        let description = self.optional_str(map, "description", "metadata");
        let author = self.optional_str(map, "author", "metadata");
        let created_at = self.optional_str(map, "createdAt", "metadata");
        let updated_at = self.optional_str(map, "updatedAt", "metadata");
        let tags = self.string_list(map, "tags", "metadata");

        Some(PlanMetadata {
            id: id?,
            name: name?,
            version: version?,
            description,
            author,
            created_at,
            updated_at,
            tags,
        })
    }

    fn decode_tasks(&mut self, items: &[Value]) -> (Vec<Task>, Vec<TaskHead>) {
        let mut tasks = Vec::new();
        let mut heads: Vec<TaskHead> = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (i, item) in items.iter().enumerate() {
            let path = format!("tasks[{i}]");
            let Some(map) = self.mapping(item, &path) else {
                continue;
            };

            let id = self.required_str(map, "id", &path);
            let name = self.required_str(map, "name", &path);
            let description = self.optional_str(map, "description", &path);
            let depends_on = self.string_list(map, "dependsOn", &path);
            let working_dir = self
                .optional_str(map, "workingDir", &path)
                .map(PathBuf::from);
            let env = self.string_map(map, "env", &path);
            let timeout = self.optional_seconds(map, "timeout", &path, Bound::Positive);
            let retry = self.decode_retry(map, &path);
            let action = self.decode_action(map, &path);

            let Some(id) = id else {
                continue;
            };
            if let Some(first) = first_seen.get(&id) {
                self.error(
                    ValidationErrorKind::DuplicateId,
                    format!("{path}.id"),
                    format!("duplicate task id '{id}' (first declared at tasks[{first}])"),
                );
                continue;
            }
            first_seen.insert(id.clone(), i);
            heads.push(TaskHead {
                path: path.clone(),
                id: id.clone(),
                depends_on: depends_on.clone(),
            });

            let (Some(name), Some(action)) = (name, action) else {
                continue;
            };

            let task = Task {
                id,
                name,
                description,
                action,
                working_dir,
                env,
                depends_on,
                timeout,
                retry,
                status: Default::default(),
                result: None,
            };
            if task.is_agent_task() && task.timeout.is_none() && task.retry.is_none() {
                self.warn(
                    path,
                    format!(
                        "agent task '{}' has no timeout or retry policy configured",
                        task.id
                    ),
                );
            }
            tasks.push(task);
        }

        (tasks, heads)
    }

    fn decode_action(&mut self, map: &Mapping, path: &str) -> Option<TaskAction> {
        let tag = match map.get("type") {
            None | Some(Value::Null) => TaskKind::Command.as_str().to_string(),
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(path, "type"),
                    format!("expected a string, found {}", type_name(other)),
                );
                return None;
            }
        };

        if let Some(kind) = TaskKind::parse(&tag) {
            let command = self.required_str(map, "command", path)?;
            return Some(TaskAction::Command { kind, command });
        }

        if let Some(kind) = AgentKind::parse(&tag) {
            let input = self.decode_agent_input(map, path);
            let strategy = self.decode_strategy(map, path);
            return Some(TaskAction::Agent {
                kind,
                input: input?,
                strategy: strategy?,
            });
        }

        self.error(
            ValidationErrorKind::WrongType,
            join(path, "type"),
            format!("unknown task type '{tag}'"),
        );
        None
    }

    fn decode_agent_input(&mut self, map: &Mapping, path: &str) -> Option<AgentInput> {
        let input_path = join(path, "input");
        let input = match map.get("input") {
            None | Some(Value::Null) => {
                self.error(
                    ValidationErrorKind::MissingField,
                    input_path,
                    "agent tasks require an 'input' mapping",
                );
                return None;
            }
            Some(Value::Mapping(input)) => input,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    input_path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                return None;
            }
        };

        let kind = self.required_str(input, "type", &input_path);
        let context_path = join(&input_path, "context");
        let context = match input.get("context") {
            None | Some(Value::Null) => {
                self.error(
                    ValidationErrorKind::MissingField,
                    context_path,
                    "required field 'context' is missing",
                );
                None
            }
            Some(Value::Mapping(context)) => self.json_map(context, &context_path, &[]),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    context_path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                None
            }
        };

        Some(AgentInput {
            kind: kind?,
            context: context?,
        })
    }

    fn decode_strategy(&mut self, map: &Mapping, path: &str) -> Option<ExecutionStrategy> {
        let strategy = self.required_str(map, "strategy", path)?;
        let parsed = ExecutionStrategy::parse(&strategy);
        if parsed.is_none() {
            self.error(
                ValidationErrorKind::WrongType,
                join(path, "strategy"),
                format!(
                    "unknown execution strategy '{strategy}' (expected sequential, parallel or adaptive)"
                ),
            );
        }
        parsed
    }

    fn decode_retry(&mut self, map: &Mapping, path: &str) -> Option<RetryPolicy> {
        let retry_path = join(path, "retry");
        let retry = match map.get("retry") {
            None | Some(Value::Null) => return None,
            Some(Value::Mapping(retry)) => retry,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    retry_path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                return None;
            }
        };

        let attempts_path = join(&retry_path, "maxAttempts");
        let max_attempts = match retry.get("maxAttempts") {
            None | Some(Value::Null) => {
                self.error(
                    ValidationErrorKind::MissingField,
                    attempts_path,
                    "required field 'maxAttempts' is missing",
                );
                None
            }
            Some(value) => self.attempt_count(value, attempts_path),
        };

        let delay = self
            .optional_seconds(retry, "delay", &retry_path, Bound::NonNegative)
            .unwrap_or(Duration::ZERO);

        let backoff_path = join(&retry_path, "backoffMultiplier");
        let backoff_multiplier = match retry.get("backoffMultiplier") {
            None | Some(Value::Null) => None,
            Some(value) => match value.as_f64() {
                Some(factor) if factor.is_finite() && factor > 0.0 => Some(factor),
                Some(_) => {
                    self.error(
                        ValidationErrorKind::OutOfRange,
                        backoff_path,
                        "must be greater than 0",
                    );
                    None
                }
                None => {
                    self.error(
                        ValidationErrorKind::WrongType,
                        backoff_path,
                        format!("expected a number, found {}", type_name(value)),
                    );
                    None
                }
            },
        };

        Some(RetryPolicy {
            max_attempts: max_attempts?,
            delay,
            backoff_multiplier,
        })
    }

    fn attempt_count(&mut self, value: &Value, path: String) -> Option<u32> {
        if let Some(n) = value.as_u64() {
            if n == 0 {
                self.error(ValidationErrorKind::OutOfRange, path, "must be at least 1");
                return None;
            }
            return match u32::try_from(n) {
                Ok(n) => Some(n),
                Err(_) => {
                    self.error(ValidationErrorKind::OutOfRange, path, "is too large");
                    None
                }
            };
        }
        if value.as_i64().is_some() {
            self.error(ValidationErrorKind::OutOfRange, path, "must be at least 1");
        } else if value.is_number() {
            self.error(ValidationErrorKind::WrongType, path, "must be an integer");
        } else {
            self.error(
                ValidationErrorKind::WrongType,
                path,
                format!("expected an integer, found {}", type_name(value)),
            );
        }
        None
    }

    fn decode_gates(
        &mut self,
        items: &[Value],
    ) -> (Vec<QualityGateConfig>, Vec<(String, String)>) {
        let mut gates = Vec::new();
        let mut task_refs = Vec::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();

        for (i, item) in items.iter().enumerate() {
            let path = format!("qualityGates[{i}]");
            let Some(map) = self.mapping(item, &path) else {
                continue;
            };

            let id = self.required_str(map, "id", &path);
            let name = self.required_str(map, "name", &path);
            let kind = self.decode_gate_kind(map, &path);
            let required = self.optional_bool(map, "required", &path).unwrap_or(true);
            let settings = self.decode_gate_settings(map, &path);
            let task_id = self.optional_str(map, "taskId", &path);

            if let Some(task_id) = &task_id {
                task_refs.push((join(&path, "taskId"), task_id.clone()));
            }

            let Some(id) = id else {
                continue;
            };
            if let Some(first) = first_seen.get(&id) {
                self.error(
                    ValidationErrorKind::DuplicateId,
                    format!("{path}.id"),
                    format!("duplicate gate id '{id}' (first declared at qualityGates[{first}])"),
                );
                continue;
            }
            first_seen.insert(id.clone(), i);

            if let (Some(name), Some(kind), Some(settings)) = (name, kind, settings) {
                gates.push(QualityGateConfig {
                    id,
                    name,
                    kind,
                    required,
                    settings,
                    task_id,
                });
            }
        }

        (gates, task_refs)
    }

    fn decode_gate_kind(&mut self, map: &Mapping, path: &str) -> Option<GateKind> {
        let tag = match map.get("type") {
            None | Some(Value::Null) => return Some(GateKind::Lint),
            Some(Value::String(tag)) => tag,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(path, "type"),
                    format!("expected a string, found {}", type_name(other)),
                );
                return None;
            }
        };

        let kind = GateKind::parse(tag);
        if kind.is_none() {
            self.error(
                ValidationErrorKind::WrongType,
                join(path, "type"),
                format!(
                    "unknown gate type '{tag}' (expected lint, type-check, test, build, integration or deploy)"
                ),
            );
        }
        kind
    }

    fn decode_gate_settings(&mut self, map: &Mapping, path: &str) -> Option<GateSettings> {
        let config_path = join(path, "config");
        let config = match map.get("config") {
            None | Some(Value::Null) => return Some(GateSettings::default()),
            Some(Value::Mapping(config)) => config,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    config_path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                return None;
            }
        };

        let command = self.optional_str(config, "command", &config_path);
        let timeout = self.optional_seconds(config, "timeout", &config_path, Bound::Positive);
        let extra = self.json_map(config, &config_path, &["command", "timeout"])?;

        Some(GateSettings {
            command,
            timeout,
            extra,
        })
    }

    // Field helpers

    fn error(
        &mut self,
        kind: ValidationErrorKind,
        path: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.errors.push(ValidationError::new(kind, path, message));
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning::new(path, message));
    }

    fn mapping<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Mapping> {
        match value {
            Value::Mapping(map) => Some(map),
            other => {
                self.error(
                    ValidationErrorKind::WrongType,
                    path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn sequence<'v>(&mut self, map: &'v Mapping, key: &str, parent: &str) -> &'v [Value] {
        match map.get(key) {
            None | Some(Value::Null) => &[],
            Some(Value::Sequence(items)) => items.as_slice(),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(parent, key),
                    format!("expected a sequence, found {}", type_name(other)),
                );
                &[]
            }
        }
    }

    fn required_str(&mut self, map: &Mapping, key: &str, parent: &str) -> Option<String> {
        match map.get(key) {
            None | Some(Value::Null) => {
                self.error(
                    ValidationErrorKind::MissingField,
                    join(parent, key),
                    format!("required field '{key}' is missing"),
                );
                None
            }
            Some(Value::String(s)) if s.trim().is_empty() => {
                self.error(
                    ValidationErrorKind::MissingField,
                    join(parent, key),
                    format!("required field '{key}' must not be empty"),
                );
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(parent, key),
                    format!("expected a string, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn optional_str(&mut self, map: &Mapping, key: &str, parent: &str) -> Option<String> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(parent, key),
                    format!("expected a string, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn optional_bool(&mut self, map: &Mapping, key: &str, parent: &str) -> Option<bool> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(*b),
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    join(parent, key),
                    format!("expected a boolean, found {}", type_name(other)),
                );
                None
            }
        }
    }

    fn optional_seconds(
        &mut self,
        map: &Mapping,
        key: &str,
        parent: &str,
        bound: Bound,
    ) -> Option<Duration> {
        let value = match map.get(key) {
            None | Some(Value::Null) => return None,
            Some(value) => value,
        };
        let path = join(parent, key);

        let Some(secs) = value.as_f64() else {
            self.error(
                ValidationErrorKind::WrongType,
                path,
                format!("expected a number of seconds, found {}", type_name(value)),
            );
            return None;
        };

        let in_range = match bound {
            Bound::Positive => secs > 0.0,
            Bound::NonNegative => secs >= 0.0,
        };
        if !in_range {
            let message = match bound {
                Bound::Positive => "must be greater than 0",
                Bound::NonNegative => "must not be negative",
            };
            self.error(ValidationErrorKind::OutOfRange, path, message);
            return None;
        }

        match Duration::try_from_secs_f64(secs) {
            Ok(duration) => Some(duration),
            Err(_) => {
                self.error(ValidationErrorKind::OutOfRange, path, "is too large");
                None
            }
        }
    }

    fn string_list(&mut self, map: &Mapping, key: &str, parent: &str) -> Vec<String> {
        let path = join(parent, key);
        let items = self.sequence(map, key, parent);

        let mut values: Vec<String> = Vec::with_capacity(items.len());
        for (j, item) in items.iter().enumerate() {
            match item {
                Value::String(s) => {
                    if !values.contains(s) {
                        values.push(s.clone());
                    }
                }
                other => self.error(
                    ValidationErrorKind::WrongType,
                    format!("{path}[{j}]"),
                    format!("expected a string, found {}", type_name(other)),
                ),
            }
        }
        values
    }

    /// Environment overrides; scalar values are stringified
    fn string_map(&mut self, map: &Mapping, key: &str, parent: &str) -> BTreeMap<String, String> {
        let path = join(parent, key);
        let entries = match map.get(key) {
            None | Some(Value::Null) => return BTreeMap::new(),
            Some(Value::Mapping(entries)) => entries,
            Some(other) => {
                self.error(
                    ValidationErrorKind::WrongType,
                    path,
                    format!("expected a mapping, found {}", type_name(other)),
                );
                return BTreeMap::new();
            }
        };

        let mut values = BTreeMap::new();
        for (name, value) in entries {
            let Some(name) = name.as_str() else {
                self.error(
                    ValidationErrorKind::WrongType,
                    path.clone(),
                    format!("keys must be strings, found {}", type_name(name)),
                );
                continue;
            };
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                other => {
                    self.error(
                        ValidationErrorKind::WrongType,
                        join(&path, name),
                        format!("expected a scalar value, found {}", type_name(other)),
                    );
                    continue;
                }
            };
            values.insert(name.to_string(), value);
        }
        values
    }

    /// Convert a mapping into JSON values, skipping the `reserved` keys
    fn json_map(
        &mut self,
        map: &Mapping,
        path: &str,
        reserved: &[&str],
    ) -> Option<BTreeMap<String, serde_json::Value>> {
        let mut values = BTreeMap::new();
        let mut ok = true;
        for (key, value) in map {
            let Some(key) = key.as_str() else {
                self.error(
                    ValidationErrorKind::WrongType,
                    path,
                    format!("keys must be strings, found {}", type_name(key)),
                );
                ok = false;
                continue;
            };
            if reserved.contains(&key) {
                continue;
            }
            match serde_json::to_value(value) {
                Ok(json) => {
                    values.insert(key.to_string(), json);
                }
                Err(e) => {
                    self.error(
                        ValidationErrorKind::WrongType,
                        join(path, key),
                        format!("value cannot be represented as JSON: {e}"),
                    );
                    ok = false;
                }
            }
        }
        ok.then_some(values)
    }
}

fn join(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
