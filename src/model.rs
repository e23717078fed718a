use crate::error::{PlanError, PlanResult};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

/// Tasks seeded onto a freshly created day unless configured otherwise.
pub const DEFAULT_TASKS: [&str; 3] = ["Clean-up", "Classwork", "Work-out"];

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Empty,
    None,
    Partial,
    Complete,
}

impl CompletionStatus {
    fn from_counts(completed: usize, total: usize) -> Self {
        if total == 0 {
            CompletionStatus::Empty
        } else if completed == 0 {
            CompletionStatus::None
        } else if completed == total {
            CompletionStatus::Complete
        } else {
            CompletionStatus::Partial
        }
    }
}

/// Percentage rounded to the nearest integer, halves to even; 0 when there is
/// nothing to complete.
pub fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round_ties_even() as u32
}

/// Ratio in [0, 1]; 0 when there is nothing to complete.
pub fn ratio(completed: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        completed as f64 / total as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: &str) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            completed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub is_default: bool,
    #[serde(rename = "is_expanded", alias = "expanded", default = "default_true")]
    pub expanded: bool,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(title: &str, is_default: bool) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            completed: false,
            created_at: now(),
            completed_at: None,
            is_default,
            expanded: true,
            subtasks: Vec::new(),
        }
    }

    pub fn toggle_expand(&mut self) -> bool {
        self.expanded = !self.expanded;
        self.expanded
    }

    pub fn subtask_mut(&mut self, subtask_id: &str) -> PlanResult<&mut Subtask> {
        self.subtasks
            .iter_mut()
            .find(|s| s.id == subtask_id)
            .ok_or_else(|| PlanError::not_found("subtask", subtask_id))
    }

    pub fn add_subtask(&mut self, title: &str) -> &Subtask {
        self.subtasks.push(Subtask::new(title));
        &self.subtasks[self.subtasks.len() - 1]
    }

    /// Flips a subtask and returns its new state. The parent task is untouched.
    pub fn toggle_subtask(&mut self, subtask_id: &str) -> PlanResult<bool> {
        let st = self.subtask_mut(subtask_id)?;
        st.completed = !st.completed;
        Ok(st.completed)
    }

    pub fn remove_subtask(&mut self, subtask_id: &str) -> PlanResult<Subtask> {
        let idx = self
            .subtasks
            .iter()
            .position(|s| s.id == subtask_id)
            .ok_or_else(|| PlanError::not_found("subtask", subtask_id))?;
        Ok(self.subtasks.remove(idx))
    }

    /// (completed, total) subtask counts.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.completed).count();
        (done, self.subtasks.len())
    }

    pub fn status(&self) -> CompletionStatus {
        if self.completed {
            return CompletionStatus::Complete;
        }
        let (done, total) = self.subtask_progress();
        match CompletionStatus::from_counts(done, total) {
            CompletionStatus::Empty => CompletionStatus::None,
            s => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[default]
    None,
    Low,
    Medium,
    High,
}

impl FromStr for Priority {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Priority::None),
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Blue,
    Red,
    Green,
    Yellow,
    Purple,
    Pink,
}

impl FromStr for Color {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(Color::Blue),
            "red" => Ok(Color::Red),
            "green" => Ok(Color::Green),
            "yellow" => Ok(Color::Yellow),
            "purple" => Ok(Color::Purple),
            "pink" => Ok(Color::Pink),
            _ => Err(()),
        }
    }
}

/// A task inside a collection. Unlike day tasks these carry no subtasks
/// and no expanded flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionTask {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notes: String,
}

impl CollectionTask {
    pub fn new(title: &str, priority: Priority, tags: Vec<String>, notes: &str) -> Self {
        Self {
            id: new_id(),
            title: title.trim().to_string(),
            completed: false,
            created_at: now(),
            completed_at: None,
            priority,
            tags,
            notes: notes.to_string(),
        }
    }
}

/// Common surface of the two task kinds.
pub trait TaskItem {
    fn id(&self) -> &str;
    fn is_completed(&self) -> bool;
    fn set_completed(&mut self, completed: bool);

    /// Flips completion, stamping or clearing the completion time. Returns the new state.
    fn toggle(&mut self) -> bool {
        let next = !self.is_completed();
        self.set_completed(next);
        next
    }
}

impl TaskItem for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.completed_at = completed.then(now);
    }
}

impl TaskItem for CollectionTask {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_completed(&self) -> bool {
        self.completed
    }

    fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.completed_at = completed.then(now);
    }
}

/// An owner of an ordered task list: a day or a collection.
pub trait TaskContainer {
    type Item: TaskItem;

    fn tasks(&self) -> &[Self::Item];
    fn tasks_mut(&mut self) -> &mut Vec<Self::Item>;

    fn task(&self, task_id: &str) -> PlanResult<&Self::Item> {
        self.tasks()
            .iter()
            .find(|t| t.id() == task_id)
            .ok_or_else(|| PlanError::not_found("task", task_id))
    }

    fn task_mut(&mut self, task_id: &str) -> PlanResult<&mut Self::Item> {
        self.tasks_mut()
            .iter_mut()
            .find(|t| t.id() == task_id)
            .ok_or_else(|| PlanError::not_found("task", task_id))
    }

    fn push_task(&mut self, item: Self::Item) -> &Self::Item {
        let tasks = self.tasks_mut();
        tasks.push(item);
        &tasks[tasks.len() - 1]
    }

    fn toggle_task(&mut self, task_id: &str) -> PlanResult<bool> {
        Ok(self.task_mut(task_id)?.toggle())
    }

    fn remove_task(&mut self, task_id: &str) -> PlanResult<Self::Item> {
        let idx = self
            .tasks()
            .iter()
            .position(|t| t.id() == task_id)
            .ok_or_else(|| PlanError::not_found("task", task_id))?;
        Ok(self.tasks_mut().remove(idx))
    }

    fn completed_count(&self) -> usize {
        self.tasks().iter().filter(|t| t.is_completed()).count()
    }

    fn total_count(&self) -> usize {
        self.tasks().len()
    }

    fn completion_percentage(&self) -> u32 {
        percentage(self.completed_count(), self.total_count())
    }

    fn completion_rate(&self) -> f64 {
        ratio(self.completed_count(), self.total_count())
    }

    fn completion_status(&self) -> CompletionStatus {
        CompletionStatus::from_counts(self.completed_count(), self.total_count())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(rename = "is_expanded", alias = "expanded", default = "default_true")]
    pub expanded: bool,
}

impl Day {
    pub fn new<S: AsRef<str>>(date: NaiveDate, default_tasks: &[S]) -> Self {
        Self {
            id: new_id(),
            date,
            tasks: default_tasks
                .iter()
                .map(|t| Task::new(t.as_ref(), true))
                .collect(),
            expanded: true,
        }
    }

    pub fn add_task(&mut self, title: &str) -> &Task {
        self.push_task(Task::new(title, false))
    }

    pub fn edit_task(&mut self, task_id: &str, title: &str) -> PlanResult<&Task> {
        let task = self.task_mut(task_id)?;
        task.title = title.trim().to_string();
        Ok(&*task)
    }

    pub fn in_month(&self, year: i32, month: u32) -> bool {
        self.date.year() == year && self.date.month() == month
    }
}

impl TaskContainer for Day {
    type Item = Task;

    fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    fn tasks_mut(&mut self) -> &mut Vec<Task> {
        &mut self.tasks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "now")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub tasks: Vec<CollectionTask>,
}

impl Collection {
    pub fn new(name: &str, description: &str, color: Color) -> Self {
        Self {
            id: new_id(),
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            created_at: now(),
            color,
            tasks: Vec::new(),
        }
    }
}

impl TaskContainer for Collection {
    type Item = CollectionTask;

    fn tasks(&self) -> &[CollectionTask] {
        &self.tasks
    }

    fn tasks_mut(&mut self) -> &mut Vec<CollectionTask> {
        &mut self.tasks
    }
}

/// Optional field updates for a collection.
#[derive(Debug, Clone, Default)]
pub struct CollectionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<Color>,
}

/// Optional field updates for a collection task.
#[derive(Debug, Clone, Default)]
pub struct CollectionTaskPatch {
    pub title: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

/// The whole entity graph. Days are kept in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Planner {
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default)]
    pub collections: Vec<Collection>,
}

impl Planner {
    pub fn day(&self, day_id: &str) -> PlanResult<&Day> {
        self.days
            .iter()
            .find(|d| d.id == day_id)
            .ok_or_else(|| PlanError::not_found("day", day_id))
    }

    pub fn day_mut(&mut self, day_id: &str) -> PlanResult<&mut Day> {
        self.days
            .iter_mut()
            .find(|d| d.id == day_id)
            .ok_or_else(|| PlanError::not_found("day", day_id))
    }

    pub fn day_by_date(&self, date: NaiveDate) -> Option<&Day> {
        self.days
            .binary_search_by_key(&date, |d| d.date)
            .ok()
            .map(|i| &self.days[i])
    }

    /// Creates a day seeded with `default_tasks`; fails if the date is taken.
    pub fn create_day<S: AsRef<str>>(
        &mut self,
        date: NaiveDate,
        default_tasks: &[S],
    ) -> PlanResult<&Day> {
        match self.days.binary_search_by_key(&date, |d| d.date) {
            Ok(_) => Err(PlanError::Duplicate {
                date: date.to_string(),
            }),
            Err(idx) => {
                self.days.insert(idx, Day::new(date, default_tasks));
                Ok(&self.days[idx])
            }
        }
    }

    /// Returns the day for `date`, creating it on first access. The flag reports creation.
    pub fn ensure_day<S: AsRef<str>>(
        &mut self,
        date: NaiveDate,
        default_tasks: &[S],
    ) -> (&mut Day, bool) {
        match self.days.binary_search_by_key(&date, |d| d.date) {
            Ok(idx) => (&mut self.days[idx], false),
            Err(idx) => {
                self.days.insert(idx, Day::new(date, default_tasks));
                (&mut self.days[idx], true)
            }
        }
    }

    /// Removes a day together with its tasks and subtasks.
    pub fn delete_day(&mut self, day_id: &str) -> PlanResult<Day> {
        let idx = self
            .days
            .iter()
            .position(|d| d.id == day_id)
            .ok_or_else(|| PlanError::not_found("day", day_id))?;
        Ok(self.days.remove(idx))
    }

    pub fn toggle_day_expand(&mut self, day_id: &str) -> PlanResult<bool> {
        let day = self.day_mut(day_id)?;
        day.expanded = !day.expanded;
        Ok(day.expanded)
    }

    pub fn days_in_month(&self, year: i32, month: u32) -> impl Iterator<Item = &Day> {
        self.days.iter().filter(move |d| d.in_month(year, month))
    }

    pub fn collection(&self, collection_id: &str) -> PlanResult<&Collection> {
        self.collections
            .iter()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| PlanError::not_found("collection", collection_id))
    }

    pub fn collection_mut(&mut self, collection_id: &str) -> PlanResult<&mut Collection> {
        self.collections
            .iter_mut()
            .find(|c| c.id == collection_id)
            .ok_or_else(|| PlanError::not_found("collection", collection_id))
    }

    /// Collections, newest first.
    pub fn collections_by_recency(&self) -> Vec<&Collection> {
        let mut out: Vec<&Collection> = self.collections.iter().collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out
    }

    pub fn create_collection(&mut self, name: &str, description: &str, color: Color) -> &Collection {
        self.collections.push(Collection::new(name, description, color));
        &self.collections[self.collections.len() - 1]
    }

    pub fn update_collection(
        &mut self,
        collection_id: &str,
        patch: CollectionPatch,
    ) -> PlanResult<&Collection> {
        let c = self.collection_mut(collection_id)?;
        if let Some(name) = patch.name {
            c.name = name.trim().to_string();
        }
        if let Some(description) = patch.description {
            c.description = description.trim().to_string();
        }
        if let Some(color) = patch.color {
            c.color = color;
        }
        Ok(&*c)
    }

    /// Removes a collection together with its tasks.
    pub fn delete_collection(&mut self, collection_id: &str) -> PlanResult<Collection> {
        let idx = self
            .collections
            .iter()
            .position(|c| c.id == collection_id)
            .ok_or_else(|| PlanError::not_found("collection", collection_id))?;
        Ok(self.collections.remove(idx))
    }

    pub fn add_collection_task(
        &mut self,
        collection_id: &str,
        task: CollectionTask,
    ) -> PlanResult<&CollectionTask> {
        Ok(self.collection_mut(collection_id)?.push_task(task))
    }

    pub fn update_collection_task(
        &mut self,
        collection_id: &str,
        task_id: &str,
        patch: CollectionTaskPatch,
    ) -> PlanResult<&CollectionTask> {
        let task = self.collection_mut(collection_id)?.task_mut(task_id)?;
        if let Some(title) = patch.title {
            task.title = title.trim().to_string();
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(notes) = patch.notes {
            task.notes = notes;
        }
        Ok(&*task)
    }

    /// Sorts days by date and checks the uniqueness invariants.
    pub fn normalize(&mut self) -> Result<(), String> {
        self.days.sort_by_key(|d| d.date);
        for pair in self.days.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(format!("duplicate day for date {}", pair[0].date));
            }
        }

        let mut day_ids = HashSet::new();
        for day in &self.days {
            if !day_ids.insert(day.id.as_str()) {
                return Err(format!("duplicate day id {}", day.id));
            }
            let mut task_ids = HashSet::new();
            for task in &day.tasks {
                if !task_ids.insert(task.id.as_str()) {
                    return Err(format!("duplicate task id {} in day {}", task.id, day.date));
                }
                let mut sub_ids = HashSet::new();
                for st in &task.subtasks {
                    if !sub_ids.insert(st.id.as_str()) {
                        return Err(format!("duplicate subtask id {} in task {}", st.id, task.id));
                    }
                }
            }
        }

        let mut collection_ids = HashSet::new();
        for c in &self.collections {
            if !collection_ids.insert(c.id.as_str()) {
                return Err(format!("duplicate collection id {}", c.id));
            }
            let mut task_ids = HashSet::new();
            for t in &c.tasks {
                if !task_ids.insert(t.id.as_str()) {
                    return Err(format!("duplicate task id {} in collection {}", t.id, c.id));
                }
            }
        }
        Ok(())
    }
}
