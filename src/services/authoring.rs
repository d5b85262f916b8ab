//! Input validation for creating quests and tasks.
use crate::database::models::NewQuest;
use crate::error::EngineError;
use crate::mastery::streak::Frequency;
use chrono::NaiveDate;

/// Builds a quest ready to insert. New quests are first due today.
pub fn new_quest(
    name: &str,
    frequency: Option<Frequency>,
    today: NaiveDate,
) -> Result<NewQuest, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("a quest must have a name".into()));
    }
    let frequency = frequency.unwrap_or_default();
    if frequency.period_days().is_none() {
        return Err(EngineError::Validation(format!(
            "unsupported frequency `{frequency}`"
        )));
    }
    Ok(NewQuest {
        name: name.to_string(),
        frequency,
        due_date: today,
    })
}

pub fn task_name(name: &str) -> Result<String, EngineError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(EngineError::Validation("a task must have a name".into()));
    }
    Ok(name.to_string())
}

/// A template quest with its starter checklist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetQuest {
    pub name: String,
    pub frequency: Option<Frequency>,
    pub tasks: Vec<String>,
}

/// Validates a preset. Task names come back trimmed, in template order.
pub fn from_preset(
    preset: &PresetQuest,
    today: NaiveDate,
) -> Result<(NewQuest, Vec<String>), EngineError> {
    let quest = new_quest(&preset.name, preset.frequency.clone(), today)?;
    let tasks = preset
        .tasks
        .iter()
        .map(|name| task_name(name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((quest, tasks))
}
