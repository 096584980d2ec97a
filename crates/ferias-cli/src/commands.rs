//! Subcommands and their execution.

use anyhow::{Context as _, Result, bail};
use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use ferias_client::{ApiClient, OpenHolidaysClient};
use ferias_core::{
  absence::{AbsenceDuration, AbsenceKind, AbsencePayload},
  business_days::BusinessDayCalculator,
  calendar::{CalendarEvent, project_events},
  duration::LunchBreak,
  holiday::HolidaySource,
  id::AbsenceId,
  mode::{AbsenceEditor, Mode, WorkerEditor},
  reconcile::{AbsenceForm, Reconciler, parse_time_of_day},
  store::Backend,
  worker::{AllowanceLevel, NewWorker, Worker, WorkerUpdate, find_absence, group_by_department},
};
use tracing::debug;

use crate::{
  lookup::{find_exact, resolve_worker},
  settings::Settings,
};

// ─── Context ──────────────────────────────────────────────────────────────────

/// Clients shared by every command.
pub struct Context {
  settings: Settings,
  api:      ApiClient,
  holidays: OpenHolidaysClient,
}

impl Context {
  pub fn new(settings: Settings) -> Result<Self> {
    let api = ApiClient::new(settings.api()).context("failed to build backend client")?;
    let http = reqwest::Client::builder()
      .timeout(settings.timeout())
      .build()
      .context("failed to build HTTP client")?;
    let holidays = OpenHolidaysClient::new(http, settings.holidays());
    Ok(Self { settings, api, holidays })
  }

  fn reconciler(&self) -> Reconciler<'_, OpenHolidaysClient, ApiClient> {
    Reconciler::new(&self.holidays, &self.api)
  }

  async fn workers(&self) -> Result<Vec<Worker>> {
    self
      .api
      .list_workers()
      .await
      .with_context(|| format!("failed to load workers from {}", self.api.base_url()))
  }

  /// Log in with the configured credentials.
  async fn login(&self) -> Result<Mode> {
    let (Some(user), Some(password)) = (&self.settings.username, &self.settings.password)
    else {
      bail!("this command changes data; pass --user and --password");
    };
    let credentials = self
      .api
      .credentials()
      .await
      .context("failed to load credentials")?;
    let mut mode = Mode::default();
    mode
      .login(&credentials, user, password)
      .context("login failed")?;
    Ok(mode)
  }
}

// ─── Commands ─────────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// List workers by department with their remaining allowances.
  Workers,

  /// Add, edit or remove a worker.
  #[command(subcommand)]
  Worker(WorkerCommand),

  /// Record, change, move or remove an absence.
  #[command(subcommand)]
  Absence(AbsenceCommand),

  /// Public holidays of a year.
  Holidays { year: i32 },

  /// Working days between two dates, both inclusive.
  BusinessDays { start: NaiveDate, end: NaiveDate },

  /// Calendar events touching a year.
  Calendar {
    year:   i32,
    /// Only this worker's absences (holidays are always shown).
    #[arg(long)]
    worker: Option<String>,
    /// Print the events as JSON.
    #[arg(long)]
    json:   bool,
  },
}

#[derive(Subcommand, Debug)]
pub enum WorkerCommand {
  Add {
    #[arg(long)]
    name:       String,
    #[arg(long)]
    dep:        String,
    #[arg(long, default_value = "#000000")]
    color:      String,
    /// Available vacation days.
    #[arg(long, default_value_t = 0)]
    days:       u32,
    #[arg(long, default_value_t = 0.0)]
    comp_hours: f64,
    #[arg(long, default_value_t = ferias_core::duration::DEFAULT_LUNCH_HOURS)]
    lunch:      f64,
  },
  Edit {
    /// Worker id or name.
    worker:     String,
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    dep:        Option<String>,
    #[arg(long)]
    color:      Option<String>,
    #[arg(long)]
    days:       Option<u32>,
    #[arg(long)]
    comp_hours: Option<f64>,
    #[arg(long)]
    lunch:      Option<f64>,
  },
  /// Remove a worker and all their absences.
  Rm {
    /// Worker id; names are not matched.
    id: String,
  },
}

/// Date and time fields of an absence.
#[derive(Args, Debug)]
pub struct AbsenceArgs {
  #[arg(long = "type", value_name = "TYPE")]
  kind:        Option<AbsenceKind>,
  #[arg(long)]
  start:       Option<NaiveDate>,
  /// Last day of a vacation; ignored for off-days.
  #[arg(long)]
  end:         Option<NaiveDate>,
  /// Start time (`HH:MM`) of a partial off-day.
  #[arg(long, value_parser = parse_time_of_day)]
  from:        Option<NaiveTime>,
  /// End time (`HH:MM`) of a partial off-day.
  #[arg(long, value_parser = parse_time_of_day)]
  to:          Option<NaiveTime>,
  /// Make the off-day whole again.
  #[arg(long, conflicts_with_all = ["from", "to"])]
  all_day:     bool,
  /// Whether the partial interval spans lunch.
  #[arg(long)]
  lunch:       Option<bool>,
  /// Lunch length, `1.5` or `1:30`; defaults to the worker's.
  #[arg(long)]
  lunch_break: Option<LunchBreak>,
}

impl AbsenceArgs {
  /// Overlay the given fields on `form`.
  fn apply(&self, form: &mut AbsenceForm) {
    if let Some(kind) = self.kind {
      form.kind = kind;
    }
    if let Some(start) = self.start {
      form.start_date = start;
      // A moved start without an explicit end keeps single-day absences single.
      if self.end.is_none() && form.end_date.is_some_and(|e| e < start) {
        form.end_date = Some(start);
      }
    }
    if self.end.is_some() {
      form.end_date = self.end;
    }
    if self.from.is_some() || self.to.is_some() {
      form.all_day = false;
      form.start_time = self.from.or(form.start_time);
      form.end_time = self.to.or(form.end_time);
    }
    if self.all_day {
      form.all_day = true;
      form.start_time = None;
      form.end_time = None;
    }
    if let Some(lunch) = self.lunch {
      form.lunch = lunch;
    }
    if self.lunch_break.is_some() {
      form.lunch_break = self.lunch_break;
    }
  }
}

#[derive(Subcommand, Debug)]
pub enum AbsenceCommand {
  Add {
    /// Worker id or name.
    #[arg(long)]
    worker: String,
    #[command(flatten)]
    fields: AbsenceArgs,
  },
  /// Change an absence; a new type or owner gives it a new id.
  Edit {
    id:     String,
    /// Move the absence to another worker.
    #[arg(long)]
    worker: Option<String>,
    #[command(flatten)]
    fields: AbsenceArgs,
  },
  /// Move an absence to new dates, keeping its type and times.
  Move {
    id:    String,
    start: NaiveDate,
    end:   Option<NaiveDate>,
  },
  Rm { id: String },
}

impl Command {
  pub async fn run(self, ctx: &Context) -> Result<()> {
    match self {
      Command::Workers => list_workers(ctx).await,
      Command::Worker(cmd) => cmd.run(ctx).await,
      Command::Absence(cmd) => cmd.run(ctx).await,
      Command::Holidays { year } => list_holidays(ctx, year).await,
      Command::BusinessDays { start, end } => business_days(ctx, start, end).await,
      Command::Calendar { year, worker, json } => {
        calendar(ctx, year, worker.as_deref(), json).await
      }
    }
  }
}

// ─── Read-only commands ───────────────────────────────────────────────────────

async fn list_workers(ctx: &Context) -> Result<()> {
  let workers = ctx.workers().await?;
  for (dep, members) in group_by_department(&workers) {
    println!("{}", dep.unwrap_or("(no department)"));
    for w in members {
      let comp = w.compensatory_hours.unwrap_or(0.0);
      println!(
        "  {:>4}  {:<28} {:>3} days [{}]  {:>5.1} h [{}]",
        w.id,
        w.name,
        w.available_days,
        AllowanceLevel::for_available_days(w.available_days),
        comp,
        AllowanceLevel::for_compensatory_hours(comp),
      );
    }
  }
  Ok(())
}

async fn list_holidays(ctx: &Context, year: i32) -> Result<()> {
  let events = ctx.holidays.holidays(year).await;
  if events.is_empty() {
    println!("no holidays for {year}");
  }
  for h in events {
    if h.start == h.end {
      println!("{}  {}", h.start, h.title);
    } else {
      println!("{}..{}  {}", h.start, h.end, h.title);
    }
  }
  Ok(())
}

async fn business_days(ctx: &Context, start: NaiveDate, end: NaiveDate) -> Result<()> {
  let calc = BusinessDayCalculator::new(&ctx.holidays);
  let days = calc.count(start, end).await;
  println!("{days} business days");
  match calc.adjust(start, end).await {
    Some((first, last)) => println!("first working day {first}, last {last}"),
    None => println!("no working day in range"),
  }
  Ok(())
}

async fn calendar(ctx: &Context, year: i32, worker: Option<&str>, json: bool) -> Result<()> {
  let workers = ctx.workers().await?;
  let holidays = ctx.holidays.holidays(year).await;
  let only = worker
    .map(|q| resolve_worker(&workers, q).map(|w| w.id.clone()))
    .transpose()?;

  let events: Vec<CalendarEvent> = project_events(&workers, &holidays)
    .into_iter()
    .filter(|e| e.in_year(year))
    .filter(|e| match &only {
      Some(id) => e.is_holiday() || e.worker_id.as_ref() == Some(id),
      None => true,
    })
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&events)?);
    return Ok(());
  }
  for e in &events {
    let detail = match (e.bus_days, e.abs_time) {
      _ if e.is_holiday() => "holiday".to_owned(),
      (_, Some(hours)) if e.all_day == Some(false) => format!("{hours} h"),
      (Some(days), _) => format!("{days} d"),
      _ => String::new(),
    };
    println!("{:<16} {:<16} {:<36} {}", e.start, e.end, e.title, detail);
  }
  Ok(())
}

// ─── Workers ──────────────────────────────────────────────────────────────────

impl WorkerCommand {
  async fn run(self, ctx: &Context) -> Result<()> {
    let mut mode = ctx.login().await?;
    match self {
      WorkerCommand::Add { name, dep, color, days, comp_hours, lunch } => {
        let form = NewWorker {
          title: name,
          dep,
          color,
          ava_days: days,
          comp_h: comp_hours,
          lunch_h: lunch,
        };
        mode.begin_worker(WorkerEditor::New(form.clone()))?;
        form.validate()?;
        ctx.api.create_worker(form.clone()).await?;
        println!("added {}", form.title);
      }
      WorkerCommand::Edit { worker, name, dep, color, days, comp_hours, lunch } => {
        let workers = ctx.workers().await?;
        let id = resolve_worker(&workers, &worker)?.id.clone();
        let update = WorkerUpdate {
          title:    name,
          dep,
          color,
          ava_days: days,
          comp_h:   comp_hours,
          lunch_h:  lunch,
        };
        if update.is_empty() {
          bail!("nothing to change");
        }
        mode.begin_worker(WorkerEditor::Existing { id: id.clone(), update: update.clone() })?;
        update.validate()?;
        ctx.api.update_worker(id.clone(), update).await?;
        println!("updated {id}");
      }
      WorkerCommand::Rm { id } => {
        let workers = ctx.workers().await?;
        let target = find_exact(&workers, &id)?;
        mode.begin_worker(WorkerEditor::for_worker(target))?;
        ctx.api.delete_worker(target.id.clone()).await?;
        println!("removed {} ({})", target.name, target.id);
      }
    }
    mode.finish();
    Ok(())
  }
}

// ─── Absences ─────────────────────────────────────────────────────────────────

impl AbsenceCommand {
  async fn run(self, ctx: &Context) -> Result<()> {
    let mut mode = ctx.login().await?;
    let workers = ctx.workers().await?;
    let rec = ctx.reconciler();

    match self {
      AbsenceCommand::Add { worker, fields } => {
        let owner = resolve_worker(&workers, &worker)?;
        let Some(start) = fields.start else {
          bail!("--start is required");
        };
        let kind = fields.kind.unwrap_or(AbsenceKind::Vacation);
        let mut form = AbsenceForm::new(kind, owner.id.clone(), start);
        fields.apply(&mut form);
        mode.begin_absence(AbsenceEditor::new(form))?;
        submit(&rec, &mut mode, &workers).await?;
      }
      AbsenceCommand::Edit { id, worker, fields } => {
        let id = AbsenceId::from(id);
        let (_, existing) = find_absence(&workers, &id)?;
        let mut editor = AbsenceEditor::for_absence(existing);
        if let Some(query) = worker {
          editor.form.worker_id = resolve_worker(&workers, &query)?.id.clone();
        }
        fields.apply(&mut editor.form);
        mode.begin_absence(editor)?;
        submit(&rec, &mut mode, &workers).await?;
      }
      AbsenceCommand::Move { id, start, end } => {
        let id = AbsenceId::from(id);
        let payload = rec
          .reschedule(&id, start, end.unwrap_or(start), &workers)
          .await?;
        report(&payload);
      }
      AbsenceCommand::Rm { id } => {
        let id = AbsenceId::from(id);
        find_absence(&workers, &id)?;
        rec.delete(&id).await?;
        println!("removed {id}");
      }
    }
    mode.finish();
    Ok(())
  }
}

/// Submit the absence editor open in `mode`, then close it.
async fn submit<H, B>(rec: &Reconciler<'_, H, B>, mode: &mut Mode, workers: &[Worker]) -> Result<()>
where
  H: HolidaySource,
  B: Backend,
{
  let Some(editor) = mode.absence_editor() else {
    bail!("no absence is being edited");
  };
  debug!(?editor, "submitting absence");
  let payload = rec
    .submit(editor.previous.as_ref(), &editor.form, workers)
    .await?;
  mode.finish();
  report(&payload);
  Ok(())
}

fn report(payload: &AbsencePayload) {
  let duration = match payload.to_absence().duration() {
    AbsenceDuration::BusinessDays(days) => format!("{days} business days"),
    AbsenceDuration::Hours { hours, lunch: true } => format!("{hours} h (lunch deducted)"),
    AbsenceDuration::Hours { hours, .. } => format!("{hours} h"),
  };
  println!(
    "{} {} {}..{}: {}",
    payload.id, payload.kind, payload.start, payload.end, duration
  );
}
