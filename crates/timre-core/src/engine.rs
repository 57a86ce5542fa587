//! The day-state engine.
//!
//! Owns every piece of persisted tracking state and exposes the operations a
//! front end drives: rollover, goal and intention edits, and day settlement.
//!
//! Each operation updates memory first, then writes the keys it touched.
//! Writes are independent, so multi-key operations are not atomic; they are
//! written to be safe to re-run. A failed write leaves the in-memory value in
//! place, marks the key pending and returns the error. `flush_pending`
//! retries.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::clock::{Clock, SystemClock};
use crate::day::{effective_day, DayId};
use crate::error::{CoreError, Result, StorageError};
use crate::goal::{self, GoalId, GoalUpdate, NewGoal, RecurringGoal};
use crate::intention::{self, Intention, IntentionId};
use crate::settings::{Bedtime, Settings};
use crate::settlement::{settle, CompleteDayResult, SettlementInput};
use crate::storage::{Config, KeyValueStore, StorageKey};
use crate::streak::CompletionHistory;

/// Largest legacy streak counter accepted for migration (about a century).
/// Anything above is treated as a corrupt value.
const MAX_LEGACY_STREAK_DAYS: u32 = 36_500;

/// Read-only view of the engine for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct DaySummary {
    pub effective_day: DayId,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub streak_savers: u32,
    pub max_streak_savers: u32,
    pub day_started: bool,
    pub is_new_day: bool,
    pub evening_review_open: bool,
    pub time_saved_minutes: u32,
    pub savers_earned_today: u32,
    pub goals: Vec<RecurringGoal>,
    pub intentions: Vec<Intention>,
}

/// Habit-tracking state plus the store it is persisted to.
pub struct DayStateEngine<S, C = SystemClock> {
    store: S,
    clock: C,
    config: Config,
    settings: Settings,
    goals: Vec<RecurringGoal>,
    intentions: Vec<Intention>,
    history: CompletionHistory,
    streak_savers: u32,
    last_opened_date: DayId,
    last_settled_date: Option<DayId>,
    day_started: bool,
    last_id: u64,
    pending: BTreeSet<StorageKey>,
}

impl<S: KeyValueStore, C: Clock> DayStateEngine<S, C> {
    /// Load state from `store`. Every key falls back to its default on its
    /// own when missing or unreadable; nothing here fails.
    pub fn load(store: S, clock: C, config: Config) -> Self {
        let today = effective_day(clock.now(), config.day.boundary_hour);
        let mut engine = Self {
            store,
            clock,
            settings: Settings::default(),
            goals: goal::default_goals(),
            intentions: Vec::new(),
            history: CompletionHistory::new(),
            streak_savers: 0,
            last_opened_date: today,
            last_settled_date: None,
            day_started: false,
            last_id: 0,
            pending: BTreeSet::new(),
            config,
        };

        if let Some(bedtime) = engine.read_parsed::<Bedtime>(StorageKey::Bedtime) {
            engine.settings.bedtime = bedtime;
        }
        if let Some(email) = engine.read_raw(StorageKey::UserEmail) {
            engine.settings.user_email = email;
        }
        if let Some(flag) = engine.read_bool(StorageKey::Use24HourFormat) {
            engine.settings.use_24_hour_format = flag;
        }
        if let Some(flag) = engine.read_bool(StorageKey::OnboardingCompleted) {
            engine.settings.onboarding_completed = flag;
        }
        if let Some(savers) = engine.read_parsed::<u32>(StorageKey::StreakSavers) {
            engine.streak_savers = savers.min(engine.config.limits.max_streak_savers);
        }
        engine.load_last_opened();
        engine.last_settled_date = engine.read_parsed::<DayId>(StorageKey::LastSettledDate);
        if let Some(flag) = engine.read_bool(StorageKey::DayStarted) {
            engine.day_started = flag;
        }
        if let Some(goals) = engine.read_json::<Vec<RecurringGoal>>(StorageKey::RecurringGoals) {
            engine.goals = goals;
        }
        if let Some(intentions) = engine.read_json::<Vec<Intention>>(StorageKey::DailyIntentions)
        {
            engine.intentions = intentions;
        }
        engine.load_history(today);

        engine.last_id = engine
            .goals
            .iter()
            .map(|g| g.id().0)
            .chain(engine.intentions.iter().map(|i| i.id.0))
            .max()
            .unwrap_or(0);

        engine
    }

    fn load_last_opened(&mut self) {
        let key = StorageKey::LastOpenedDate;
        match self.store.get(key.as_str()) {
            Ok(Some(raw)) => match raw.parse::<DayId>() {
                Ok(day) => self.last_opened_date = day,
                Err(e) => tracing::warn!(key = %key, error = %e, "ignoring malformed value"),
            },
            // First launch: stamp today, or every relaunch would look like the
            // same day and the rollover would never run.
            Ok(None) => {
                if let Err(e) = self.persist(&[key]) {
                    tracing::warn!(error = %e, "first-launch day not persisted yet");
                }
            }
            Err(e) => tracing::warn!(key = %key, error = %e, "read failed, using default"),
        }
    }

    fn load_history(&mut self, today: DayId) {
        let key = StorageKey::CompletionHistory;
        match self.store.get(key.as_str()) {
            Ok(Some(raw)) => match serde_json::from_str::<CompletionHistory>(&raw) {
                Ok(history) => self.history = history,
                Err(e) => tracing::warn!(key = %key, error = %e, "ignoring malformed value"),
            },
            Ok(None) => self.migrate_legacy_streak(today),
            Err(e) => tracing::warn!(key = %key, error = %e, "read failed, using default"),
        }
    }

    /// Turn a stored streak counter from before the history existed into an
    /// equivalent history, once.
    fn migrate_legacy_streak(&mut self, today: DayId) {
        let Some(legacy) = self.read_parsed::<u32>(StorageKey::LegacyCurrentStreak) else {
            return;
        };
        if legacy == 0 {
            return;
        }
        if legacy > MAX_LEGACY_STREAK_DAYS {
            tracing::warn!(
                key = %StorageKey::LegacyCurrentStreak,
                days = legacy,
                "ignoring implausible legacy streak counter"
            );
            return;
        }
        self.history = CompletionHistory::synthesize(legacy, today);
        tracing::debug!(days = legacy, "migrated legacy streak counter to history");
        if let Err(e) = self.persist(&[StorageKey::CompletionHistory]) {
            tracing::warn!(error = %e, "migrated history not persisted yet");
        }
    }

    fn read_raw(&self, key: StorageKey) -> Option<String> {
        match self.store.get(key.as_str()) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "read failed, using default");
                None
            }
        }
    }

    fn read_parsed<T>(&self, key: StorageKey) -> Option<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.read_raw(key)?;
        match raw.trim().parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring malformed value");
                None
            }
        }
    }

    fn read_bool(&self, key: StorageKey) -> Option<bool> {
        self.read_raw(key).map(|raw| raw == "true")
    }

    fn read_json<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.read_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring malformed value");
                None
            }
        }
    }

    /// Wire value of the in-memory state behind `key`. `None` means the key
    /// should be absent from the store.
    fn encode(&self, key: StorageKey) -> Result<Option<String>> {
        let value = match key {
            StorageKey::Bedtime => self.settings.bedtime.to_string(),
            StorageKey::UserEmail => self.settings.user_email.clone(),
            StorageKey::Use24HourFormat => self.settings.use_24_hour_format.to_string(),
            StorageKey::OnboardingCompleted => self.settings.onboarding_completed.to_string(),
            StorageKey::StreakSavers => self.streak_savers.to_string(),
            StorageKey::LastOpenedDate => self.last_opened_date.to_string(),
            StorageKey::DayStarted => self.day_started.to_string(),
            StorageKey::RecurringGoals => serde_json::to_string(&self.goals)?,
            StorageKey::DailyIntentions => serde_json::to_string(&self.intentions)?,
            StorageKey::CompletionHistory => serde_json::to_string(&self.history)?,
            StorageKey::LastSettledDate => match self.last_settled_date {
                Some(day) => day.to_string(),
                None => return Ok(None),
            },
            StorageKey::LegacyCurrentStreak | StorageKey::LegacyLongestStreak => return Ok(None),
        };
        Ok(Some(value))
    }

    /// Write `keys` one by one, removing those with no value. A failure
    /// marks the key pending and the remaining keys are still attempted; the
    /// first error is returned.
    fn persist(&mut self, keys: &[StorageKey]) -> Result<()> {
        let mut first_err = None;
        for &key in keys {
            let outcome = match self.encode(key) {
                Ok(Some(value)) => self
                    .store
                    .set(key.as_str(), &value)
                    .map_err(CoreError::from),
                Ok(None) => self.store.remove(key.as_str()).map_err(CoreError::from),
                Err(e) => Err(e),
            };
            match outcome {
                Ok(()) => {
                    self.pending.remove(&key);
                }
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "write failed, keeping in-memory value");
                    self.pending.insert(key);
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Retry every write that failed earlier.
    ///
    /// # Errors
    /// Returns `StorageError::Pending` listing the keys still not written.
    pub fn flush_pending(&mut self) -> Result<()> {
        let keys: Vec<StorageKey> = self.pending.iter().copied().collect();
        if keys.is_empty() {
            return Ok(());
        }
        let _ = self.persist(&keys);
        if self.pending.is_empty() {
            tracing::debug!(count = keys.len(), "flushed pending writes");
            return Ok(());
        }
        let names: Vec<&str> = self.pending.iter().map(|k| k.as_str()).collect();
        Err(StorageError::Pending {
            count: names.len(),
            keys: names.join(", "),
        }
        .into())
    }

    /// Keys whose latest in-memory value has not reached the store.
    pub fn pending_keys(&self) -> Vec<StorageKey> {
        self.pending.iter().copied().collect()
    }

    fn next_id(&mut self) -> u64 {
        let millis = self.clock.now().and_utc().timestamp_millis();
        let candidate = u64::try_from(millis).unwrap_or(0);
        let next = candidate.max(self.last_id.saturating_add(1));
        if next == self.last_id {
            // Id space exhausted by a stored id; reuse the lowest free one.
            return (1..u64::MAX).find(|id| !self.id_in_use(*id)).unwrap_or(0);
        }
        self.last_id = next;
        next
    }

    fn id_in_use(&self, id: u64) -> bool {
        self.goals.iter().any(|g| g.id().0 == id)
            || self.intentions.iter().any(|i| i.id.0 == id)
    }

    // Day boundary

    /// Today's effective calendar day.
    pub fn effective_today(&self) -> DayId {
        effective_day(self.clock.now(), self.config.day.boundary_hour)
    }

    pub fn last_opened_date(&self) -> DayId {
        self.last_opened_date
    }

    /// Whether the rollover for today's effective day has not run yet.
    pub fn is_new_day(&self) -> bool {
        self.last_opened_date != self.effective_today()
    }

    /// Reset daily progress, clear intentions and stamp today.
    pub fn start_new_day(&mut self) -> Result<()> {
        for goal in &mut self.goals {
            goal.reset_for_new_day();
        }
        self.intentions.clear();
        self.last_opened_date = self.effective_today();
        self.day_started = false;
        tracing::debug!(day = %self.last_opened_date, "started new day");
        self.persist(&[
            StorageKey::RecurringGoals,
            StorageKey::DailyIntentions,
            StorageKey::LastOpenedDate,
            StorageKey::DayStarted,
        ])
    }

    /// Run the rollover if it is due. Returns whether it ran.
    pub fn ensure_today(&mut self) -> Result<bool> {
        if !self.is_new_day() {
            return Ok(false);
        }
        self.start_new_day()?;
        Ok(true)
    }

    pub fn day_started(&self) -> bool {
        self.day_started
    }

    /// Record that the morning check-in happened (or undo it).
    pub fn set_day_started(&mut self, started: bool) -> Result<()> {
        self.day_started = started;
        self.persist(&[StorageKey::DayStarted])
    }

    // Streaks

    pub fn history(&self) -> &CompletionHistory {
        &self.history
    }

    pub fn current_streak(&self) -> u32 {
        self.history.current_streak(self.effective_today())
    }

    pub fn longest_streak(&self) -> u32 {
        self.history.longest_streak()
    }

    pub fn streak_savers(&self) -> u32 {
        self.streak_savers
    }

    // Recurring goals

    pub fn goals(&self) -> &[RecurringGoal] {
        &self.goals
    }

    pub fn goal(&self, id: GoalId) -> Option<&RecurringGoal> {
        self.goals.iter().find(|g| g.id() == id)
    }

    /// Add a goal. `Ok(None)` if its name is blank.
    pub fn add_goal(&mut self, new_goal: NewGoal) -> Result<Option<GoalId>> {
        let id = GoalId(self.next_id());
        let Some(goal) = new_goal.into_goal(id, &self.config.limits) else {
            return Ok(None);
        };
        self.goals.push(goal);
        self.persist(&[StorageKey::RecurringGoals])?;
        Ok(Some(id))
    }

    /// Remove a goal. Returns whether it existed.
    pub fn delete_goal(&mut self, id: GoalId) -> Result<bool> {
        let before = self.goals.len();
        self.goals.retain(|g| g.id() != id);
        if self.goals.len() == before {
            return Ok(false);
        }
        self.persist(&[StorageKey::RecurringGoals])?;
        Ok(true)
    }

    /// Merge `update` into a goal. Returns whether it existed.
    pub fn update_goal(&mut self, id: GoalId, update: &GoalUpdate) -> Result<bool> {
        let limits = &self.config.limits;
        let Some(goal) = self.goals.iter_mut().find(|g| g.id() == id) else {
            return Ok(false);
        };
        goal.apply(update, limits);
        self.persist(&[StorageKey::RecurringGoals])?;
        Ok(true)
    }

    /// Set today's usage for an app goal and re-derive its completion.
    /// Returns false for habits and unknown ids.
    pub fn log_usage(&mut self, id: GoalId, minutes: u32) -> Result<bool> {
        let max = self.config.limits.max_time_minutes;
        let Some(RecurringGoal::App(app)) = self.goals.iter_mut().find(|g| g.id() == id) else {
            return Ok(false);
        };
        app.used_minutes = minutes.min(max);
        app.completed = app.on_track();
        self.persist(&[StorageKey::RecurringGoals])?;
        Ok(true)
    }

    /// Flip a habit's checkbox. Returns false for app goals and unknown ids.
    pub fn toggle_habit(&mut self, id: GoalId) -> Result<bool> {
        let Some(RecurringGoal::Habit(habit)) = self.goals.iter_mut().find(|g| g.id() == id)
        else {
            return Ok(false);
        };
        habit.completed = !habit.completed;
        self.persist(&[StorageKey::RecurringGoals])?;
        Ok(true)
    }

    /// Re-derive every app goal's completion from its usage.
    pub fn refresh_app_completion(&mut self) -> Result<()> {
        if self.refresh_goals_in_memory() {
            self.persist(&[StorageKey::RecurringGoals])?;
        }
        Ok(())
    }

    fn refresh_goals_in_memory(&mut self) -> bool {
        let mut changed = false;
        for goal in &mut self.goals {
            let before = goal.is_completed();
            goal.refresh_completion();
            changed |= before != goal.is_completed();
        }
        changed
    }

    /// Minutes left under the limit across app goals.
    pub fn time_saved_today(&self) -> u32 {
        goal::time_saved(&self.goals)
    }

    // Intentions

    pub fn intentions(&self) -> &[Intention] {
        &self.intentions
    }

    /// Whether the front end should still offer "add intention". The engine
    /// itself does not enforce the cap.
    pub fn can_add_intention(&self) -> bool {
        self.intentions.len() < self.config.limits.max_intentions
    }

    /// Add an intention for today. `Ok(None)` if the text is blank.
    pub fn add_intention(&mut self, text: &str) -> Result<Option<IntentionId>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        let id = IntentionId(self.next_id());
        self.intentions.push(Intention {
            id,
            text: trimmed
                .chars()
                .take(self.config.limits.max_intention_length)
                .collect(),
            completed: false,
        });
        self.persist(&[StorageKey::DailyIntentions])?;
        Ok(Some(id))
    }

    /// Remove an intention. Returns whether it existed.
    pub fn delete_intention(&mut self, id: IntentionId) -> Result<bool> {
        let before = self.intentions.len();
        self.intentions.retain(|i| i.id != id);
        if self.intentions.len() == before {
            return Ok(false);
        }
        self.persist(&[StorageKey::DailyIntentions])?;
        Ok(true)
    }

    /// Flip an intention's completion. Returns whether it existed.
    pub fn toggle_intention(&mut self, id: IntentionId) -> Result<bool> {
        let Some(intention) = self.intentions.iter_mut().find(|i| i.id == id) else {
            return Ok(false);
        };
        intention.completed = !intention.completed;
        self.persist(&[StorageKey::DailyIntentions])?;
        Ok(true)
    }

    /// Savers today's completed intentions would earn.
    pub fn savers_earned_today(&self) -> u32 {
        intention::savers_earned(&self.intentions)
    }

    // Settlement

    /// Whether `complete_day` already ran for today's effective day.
    pub fn is_settled_today(&self) -> bool {
        self.last_settled_date == Some(self.effective_today())
    }

    /// Settle today's outcome.
    ///
    /// Savers from intentions are credited once per effective day: repeated
    /// calls on the same day keep the history idempotent and earn nothing
    /// more. A day already in the history never consumes a second saver.
    pub fn complete_day(&mut self, use_saver: bool) -> Result<CompleteDayResult> {
        self.refresh_goals_in_memory();
        let today = self.effective_today();
        let earned = if self.is_settled_today() {
            0
        } else {
            self.savers_earned_today()
        };

        let settlement = settle(SettlementInput {
            all_goals_complete: self.goals.iter().all(|g| g.is_completed()),
            use_saver,
            today_counted: self.history.contains(&today),
            saver_count: self.streak_savers,
            earned,
            max_savers: self.config.limits.max_streak_savers,
        });

        if settlement.append_today {
            self.history.insert(today);
        }
        self.streak_savers = settlement.result.new_saver_count;
        self.last_settled_date = Some(today);

        tracing::debug!(
            day = %today,
            outcome = %settlement.result.outcome,
            earned,
            savers = self.streak_savers,
            "settled day"
        );

        self.persist(&[
            StorageKey::RecurringGoals,
            StorageKey::CompletionHistory,
            StorageKey::StreakSavers,
            StorageKey::LastSettledDate,
        ])?;
        Ok(settlement.result)
    }

    // Settings

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_bedtime(&mut self, bedtime: Bedtime) -> Result<()> {
        self.settings.bedtime = bedtime;
        self.persist(&[StorageKey::Bedtime])
    }

    pub fn set_user_email(&mut self, email: &str) -> Result<()> {
        self.settings.user_email = email.trim().to_string();
        self.persist(&[StorageKey::UserEmail])
    }

    pub fn set_use_24_hour_format(&mut self, enabled: bool) -> Result<()> {
        self.settings.use_24_hour_format = enabled;
        self.persist(&[StorageKey::Use24HourFormat])
    }

    pub fn complete_onboarding(&mut self) -> Result<()> {
        self.settings.onboarding_completed = true;
        self.persist(&[StorageKey::OnboardingCompleted])
    }

    /// Whether the evening review can be opened now.
    pub fn is_evening_review_window_open(&self) -> bool {
        self.settings.is_evening_review_window_open(
            self.clock.now(),
            self.config.day.evening_review_window_hours,
        )
    }

    // Whole-state operations

    /// Delete every engine key and return to first-launch state.
    ///
    /// If the delete fails, the defaults are still applied in memory and all
    /// keys are marked pending so a flush overwrites the old values.
    pub fn reset_all_data(&mut self) -> Result<()> {
        let today = self.effective_today();
        self.settings = Settings::default();
        self.goals = goal::default_goals();
        self.intentions.clear();
        self.history = CompletionHistory::new();
        self.streak_savers = 0;
        self.last_opened_date = today;
        self.last_settled_date = None;
        self.day_started = false;
        self.pending.clear();

        let keys: Vec<&str> = StorageKey::ALL.iter().map(|k| k.as_str()).collect();
        if let Err(e) = self.store.remove_many(&keys) {
            tracing::warn!(error = %e, "reset could not clear the store");
            self.pending.extend(StorageKey::ALL);
            return Err(e.into());
        }
        tracing::debug!("reset all data");
        Ok(())
    }

    /// Everything a front end renders, derived fresh.
    pub fn snapshot(&self) -> DaySummary {
        DaySummary {
            effective_day: self.effective_today(),
            current_streak: self.current_streak(),
            longest_streak: self.longest_streak(),
            streak_savers: self.streak_savers,
            max_streak_savers: self.config.limits.max_streak_savers,
            day_started: self.day_started,
            is_new_day: self.is_new_day(),
            evening_review_open: self.is_evening_review_window_open(),
            time_saved_minutes: self.time_saved_today(),
            savers_earned_today: self.savers_earned_today(),
            goals: self.goals.clone(),
            intentions: self.intentions.clone(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::goal::{AppGoal, HabitGoal};
    use crate::settlement::Outcome;
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn engine_at(now: NaiveDateTime) -> (DayStateEngine<MemoryStore, FixedClock>, FixedClock) {
        let clock = FixedClock::new(now);
        let engine = DayStateEngine::load(MemoryStore::new(), clock.clone(), Config::default());
        (engine, clock)
    }

    fn complete_all_goals(engine: &mut DayStateEngine<MemoryStore, FixedClock>) {
        let ids: Vec<GoalId> = engine.goals().iter().map(|g| g.id()).collect();
        for id in ids {
            engine.update_goal(id, &GoalUpdate::completed(true)).unwrap();
        }
    }

    #[test]
    fn fresh_engine_uses_defaults() {
        let (engine, _) = engine_at(at(16, 9, 0));
        assert_eq!(engine.goals().len(), 3);
        assert!(engine.intentions().is_empty());
        assert_eq!(engine.streak_savers(), 0);
        assert_eq!(engine.current_streak(), 0);
        assert!(!engine.is_new_day());
        assert_eq!(engine.settings().bedtime.to_string(), "22:00");
    }

    #[test]
    fn first_launch_stamps_the_day() {
        let (engine, clock) = engine_at(at(16, 9, 0));
        assert_eq!(
            engine.store().raw(StorageKey::LastOpenedDate.as_str()),
            Some("2026-10-16")
        );

        clock.set(at(17, 9, 0));
        let reloaded = DayStateEngine::load(engine.into_store(), clock, Config::default());
        assert!(reloaded.is_new_day());
    }

    #[test]
    fn late_night_still_counts_for_yesterday() {
        let (engine, _) = engine_at(at(17, 1, 30));
        assert_eq!(engine.effective_today(), DayId::from_ymd(2026, 10, 16).unwrap());
    }

    #[test]
    fn rollover_resets_progress_but_not_identity() {
        let (mut engine, clock) = engine_at(at(16, 9, 0));
        engine.log_usage(GoalId(1), 45).unwrap();
        engine.toggle_habit(GoalId(3)).unwrap();
        engine.add_intention("write report").unwrap();

        clock.set(at(17, 8, 0));
        assert!(engine.is_new_day());
        assert!(engine.ensure_today().unwrap());
        assert!(!engine.ensure_today().unwrap());

        match engine.goal(GoalId(1)).unwrap() {
            RecurringGoal::App(AppGoal {
                name,
                limit_minutes,
                used_minutes,
                color,
                completed,
                ..
            }) => {
                assert_eq!(name, "Instagram");
                assert_eq!(*limit_minutes, 30);
                assert_eq!(*used_minutes, 0);
                assert_eq!(color, "#e4405f");
                assert!(!completed);
            }
            other => panic!("expected app goal, got {other:?}"),
        }
        match engine.goal(GoalId(3)).unwrap() {
            RecurringGoal::Habit(HabitGoal { completed, .. }) => assert!(!completed),
            other => panic!("expected habit goal, got {other:?}"),
        }
        assert!(engine.intentions().is_empty());
        assert!(!engine.day_started());
    }

    #[test]
    fn start_new_day_is_safe_to_repeat() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        engine.start_new_day().unwrap();
        let goals = engine.goals().to_vec();
        engine.start_new_day().unwrap();
        assert_eq!(engine.goals(), goals.as_slice());
    }

    #[test]
    fn intention_input_rules() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        assert_eq!(engine.add_intention("   ").unwrap(), None);
        let id = engine.add_intention("  gym  ").unwrap().unwrap();
        assert_eq!(engine.intentions()[0].text, "gym");

        let long = "a".repeat(300);
        engine.add_intention(&long).unwrap();
        assert_eq!(engine.intentions()[1].text.chars().count(), 200);

        assert!(engine.toggle_intention(id).unwrap());
        assert!(engine.intentions()[0].completed);
        assert!(!engine.toggle_intention(IntentionId(42)).unwrap());
        assert!(engine.delete_intention(id).unwrap());
        assert!(!engine.delete_intention(id).unwrap());
    }

    #[test]
    fn intention_cap_is_advisory() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        for n in 0..5 {
            engine.add_intention(&format!("task {n}")).unwrap();
        }
        assert!(!engine.can_add_intention());
        assert!(engine.add_intention("one more").unwrap().is_some());
        assert_eq!(engine.intentions().len(), 6);
    }

    #[test]
    fn ids_are_unique_within_one_instant() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        let a = engine.add_intention("a").unwrap().unwrap();
        let b = engine.add_intention("b").unwrap().unwrap();
        let g = engine
            .add_goal(NewGoal::Habit {
                name: "Stretch".into(),
                color: None,
            })
            .unwrap()
            .unwrap();
        assert!(a.0 < b.0);
        assert!(b.0 < g.0);
    }

    #[test]
    fn goal_crud() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        let id = engine
            .add_goal(NewGoal::App {
                name: "YouTube".into(),
                limit_minutes: 60,
                color: "#ff0000".into(),
            })
            .unwrap()
            .unwrap();
        assert_eq!(engine.goals().len(), 4);

        let update = GoalUpdate {
            name: Some("YouTube Shorts".into()),
            limit_minutes: Some(20),
            ..GoalUpdate::default()
        };
        assert!(engine.update_goal(id, &update).unwrap());
        assert_eq!(engine.goal(id).unwrap().name(), "YouTube Shorts");

        assert!(!engine.update_goal(GoalId(999), &update).unwrap());
        assert!(engine.delete_goal(id).unwrap());
        assert!(!engine.delete_goal(id).unwrap());
        assert_eq!(engine.goals().len(), 3);
    }

    #[test]
    fn log_usage_sets_completion() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        engine.log_usage(GoalId(1), 20).unwrap();
        assert!(engine.goal(GoalId(1)).unwrap().is_completed());
        engine.log_usage(GoalId(1), 31).unwrap();
        assert!(!engine.goal(GoalId(1)).unwrap().is_completed());
        assert!(!engine.log_usage(GoalId(3), 10).unwrap());
    }

    #[test]
    fn maintained_day_appends_and_banks() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        let id = engine.add_intention("read").unwrap().unwrap();
        engine.toggle_intention(id).unwrap();
        complete_all_goals(&mut engine);

        let result = engine.complete_day(false).unwrap();
        assert_eq!(result.outcome, Outcome::StreakMaintained);
        assert_eq!(result.savers_earned, 1);
        assert_eq!(engine.streak_savers(), 1);
        assert_eq!(engine.current_streak(), 1);
    }

    #[test]
    fn settlement_refreshes_app_completion() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        complete_all_goals(&mut engine);
        // Usage edited directly past the limit while `completed` stayed true.
        engine
            .update_goal(
                GoalId(2),
                &GoalUpdate {
                    used_minutes: Some(90),
                    ..GoalUpdate::default()
                },
            )
            .unwrap();
        let result = engine.complete_day(false).unwrap();
        assert_eq!(result.outcome, Outcome::StreakBroken);
        assert!(!engine.goal(GoalId(2)).unwrap().is_completed());
    }

    #[test]
    fn broken_day_leaves_history_alone() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        let result = engine.complete_day(true).unwrap();
        assert_eq!(result.outcome, Outcome::StreakBroken);
        assert!(engine.history().is_empty());
    }

    #[test]
    fn repeated_settlement_does_not_recredit() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        for text in ["a", "b", "c"] {
            let id = engine.add_intention(text).unwrap().unwrap();
            engine.toggle_intention(id).unwrap();
        }
        complete_all_goals(&mut engine);

        let first = engine.complete_day(false).unwrap();
        let second = engine.complete_day(false).unwrap();
        assert_eq!(first.savers_earned, 2);
        assert_eq!(second.savers_earned, 0);
        assert_eq!(engine.streak_savers(), 2);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn repeated_saver_use_consumes_once() {
        let store = MemoryStore::with_entries([(StorageKey::StreakSavers.as_str(), "3")]);
        let clock = FixedClock::new(at(16, 21, 30));
        let mut engine = DayStateEngine::load(store, clock, Config::default());

        assert_eq!(engine.complete_day(true).unwrap().outcome, Outcome::SaverUsed);
        assert_eq!(engine.complete_day(true).unwrap().outcome, Outcome::SaverUsed);
        assert_eq!(engine.streak_savers(), 2);
    }

    #[test]
    fn unchecking_after_settlement_reports_broken_without_saver() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        complete_all_goals(&mut engine);
        let first = engine.complete_day(false).unwrap();
        assert_eq!(first.outcome, Outcome::StreakMaintained);

        engine.toggle_habit(GoalId(3)).unwrap();
        let second = engine.complete_day(false).unwrap();
        assert_eq!(second.outcome, Outcome::StreakBroken);
        assert!(!second.success);
        assert_eq!(second.new_saver_count, 0);
        assert_eq!(engine.streak_savers(), 0);
        assert_eq!(engine.history().len(), 1);
    }

    #[test]
    fn settlement_on_next_day_credits_again() {
        let (mut engine, clock) = engine_at(at(16, 21, 30));
        let id = engine.add_intention("a").unwrap().unwrap();
        engine.toggle_intention(id).unwrap();
        complete_all_goals(&mut engine);
        engine.complete_day(false).unwrap();

        clock.advance(Duration::days(1));
        engine.ensure_today().unwrap();
        let id = engine.add_intention("b").unwrap().unwrap();
        engine.toggle_intention(id).unwrap();
        complete_all_goals(&mut engine);
        let result = engine.complete_day(false).unwrap();
        assert_eq!(result.savers_earned, 1);
        assert_eq!(engine.streak_savers(), 2);
        assert_eq!(engine.current_streak(), 2);
    }

    #[test]
    fn write_failure_keeps_memory_and_flushes_later() {
        let (mut engine, _) = engine_at(at(16, 9, 0));
        engine.store_mut().set_fail_writes(true);

        let err = engine.add_intention("survive outage");
        assert!(err.is_err());
        assert_eq!(engine.intentions().len(), 1);
        assert_eq!(engine.pending_keys(), vec![StorageKey::DailyIntentions]);
        assert!(engine.flush_pending().is_err());

        engine.store_mut().set_fail_writes(false);
        engine.flush_pending().unwrap();
        assert!(engine.pending_keys().is_empty());
        let raw = engine
            .store()
            .raw(StorageKey::DailyIntentions.as_str())
            .unwrap();
        assert!(raw.contains("survive outage"));
    }

    #[test]
    fn read_failure_falls_back_to_defaults() {
        let mut store = MemoryStore::with_entries([(StorageKey::StreakSavers.as_str(), "4")]);
        store.set_fail_reads(true);
        let engine = DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
        assert_eq!(engine.streak_savers(), 0);
        assert_eq!(engine.goals().len(), 3);
    }

    #[test]
    fn malformed_values_fall_back_per_key() {
        let store = MemoryStore::with_entries([
            (StorageKey::RecurringGoals.as_str(), "{not json"),
            (StorageKey::StreakSavers.as_str(), "five"),
            (StorageKey::Bedtime.as_str(), "23:15"),
        ]);
        let engine = DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
        assert_eq!(engine.goals(), goal::default_goals().as_slice());
        assert_eq!(engine.streak_savers(), 0);
        assert_eq!(engine.settings().bedtime.to_string(), "23:15");
    }

    #[test]
    fn stored_savers_above_cap_are_clamped() {
        let store = MemoryStore::with_entries([(StorageKey::StreakSavers.as_str(), "12")]);
        let engine = DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
        assert_eq!(engine.streak_savers(), 7);
    }

    #[test]
    fn implausible_legacy_streak_is_ignored() {
        for raw in ["4294967295", "60000"] {
            let store =
                MemoryStore::with_entries([(StorageKey::LegacyCurrentStreak.as_str(), raw)]);
            let engine =
                DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
            assert!(engine.history().is_empty());
            assert_eq!(engine.current_streak(), 0);
            assert!(engine
                .store()
                .raw(StorageKey::CompletionHistory.as_str())
                .is_none());
        }
    }

    #[test]
    fn legacy_streak_at_bound_migrates() {
        let store =
            MemoryStore::with_entries([(StorageKey::LegacyCurrentStreak.as_str(), "36500")]);
        let engine = DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
        assert_eq!(engine.history().len(), 36_500);
        assert_eq!(engine.current_streak(), 36_500);
    }

    #[test]
    fn exhausted_id_space_reuses_free_id() {
        let goals = vec![RecurringGoal::Habit(HabitGoal {
            id: GoalId(u64::MAX),
            name: "Stretch".into(),
            color: None,
            completed: false,
        })];
        let raw = serde_json::to_string(&goals).unwrap();
        let store =
            MemoryStore::with_entries([(StorageKey::RecurringGoals.as_str(), raw.as_str())]);
        let mut engine =
            DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());

        let first = engine.add_intention("read").unwrap().unwrap();
        let second = engine
            .add_goal(NewGoal::Habit {
                name: "Walk".into(),
                color: None,
            })
            .unwrap()
            .unwrap();
        assert_ne!(first.0, u64::MAX);
        assert_ne!(second.0, u64::MAX);
        assert_ne!(first.0, second.0);
    }

    #[test]
    fn reset_restores_first_launch_state() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        complete_all_goals(&mut engine);
        engine.complete_day(false).unwrap();
        engine.set_bedtime(Bedtime::parse("23:00").unwrap()).unwrap();
        engine.complete_onboarding().unwrap();

        engine.reset_all_data().unwrap();
        assert!(engine.store().is_empty());
        assert!(engine.history().is_empty());
        assert_eq!(engine.settings(), &Settings::default());
        assert_eq!(engine.goals(), goal::default_goals().as_slice());
        assert!(!engine.is_settled_today());
    }

    #[test]
    fn failed_reset_is_completed_by_flush() {
        let store = MemoryStore::with_entries([
            (StorageKey::StreakSavers.as_str(), "5"),
            (StorageKey::LegacyCurrentStreak.as_str(), "9"),
            (StorageKey::CompletionHistory.as_str(), "[\"2026-10-15\"]"),
        ]);
        let mut engine =
            DayStateEngine::load(store, FixedClock::new(at(16, 9, 0)), Config::default());
        engine.store_mut().set_fail_writes(true);
        assert!(engine.reset_all_data().is_err());
        assert_eq!(engine.streak_savers(), 0);
        assert_eq!(engine.pending_keys().len(), StorageKey::ALL.len());

        engine.store_mut().set_fail_writes(false);
        engine.flush_pending().unwrap();
        let store = engine.store();
        assert_eq!(store.raw(StorageKey::StreakSavers.as_str()), Some("0"));
        assert_eq!(store.raw(StorageKey::CompletionHistory.as_str()), Some("[]"));
        assert!(store.raw(StorageKey::LegacyCurrentStreak.as_str()).is_none());
        assert!(store.raw(StorageKey::LastSettledDate.as_str()).is_none());
    }

    #[test]
    fn snapshot_reflects_state() {
        let (mut engine, _) = engine_at(at(16, 21, 30));
        engine.log_usage(GoalId(2), 10).unwrap();
        let summary = engine.snapshot();
        assert_eq!(summary.time_saved_minutes, 30 + 35);
        assert!(summary.evening_review_open);
        assert_eq!(summary.max_streak_savers, 7);
        assert_eq!(summary.effective_day, DayId::from_ymd(2026, 10, 16).unwrap());
    }
}
