use crate::{acquire_image, catalog::TreatmentCatalog, diagnosis::Diagnose};

use super::{controller::WorkflowController, state::Page};

pub const HELP: &str = "\
Commands:
  capture <path>              analyse a leaf photo
  wait                        wait for the running analysis
  go <page>                   capture | results | treatments | monitor
  field <acres>               set the field size for cost estimates
  select <treatment-id>       pick a treatment for the cost calculator
  compare <treatment-id>      add/remove a treatment from the comparison (max 3)
  schedule <id> [YYYY-MM-DD]  schedule a treatment (defaults to today)
  photo <path>                record a progress photo
  mode                        switch between offline and online processing
  view                        show the current page
  help                        show this text
  quit                        save and exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Capture(String),
    Wait,
    Go(Page),
    Field(String),
    Select(String),
    Compare(String),
    Schedule {
        treatment_id: String,
        start: Option<String>,
    },
    Photo(String),
    Mode,
    View,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let required = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("`{verb}` needs {what}"))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_ascii_lowercase().as_str() {
            "capture" => required("an image path").map(Command::Capture),
            "wait" => Ok(Command::Wait),
            "go" => {
                let target = required("a page")?;
                Page::parse(&target)
                    .map(Command::Go)
                    .ok_or_else(|| format!("unknown page '{target}'"))
            }
            // empty input is a valid (zero) field size
            "field" => Ok(Command::Field(rest.to_string())),
            "select" => required("a treatment id").map(Command::Select),
            "compare" => required("a treatment id").map(Command::Compare),
            "schedule" => {
                let args = required("a treatment id")?;
                let mut parts = args.split_whitespace();
                let treatment_id = parts.next().unwrap_or_default().to_string();
                let start = parts.next().map(str::to_string);
                Ok(Command::Schedule {
                    treatment_id,
                    start,
                })
            }
            "photo" => required("an image path").map(Command::Photo),
            "mode" => Ok(Command::Mode),
            "view" => Ok(Command::View),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}' (try `help`)")),
        }
    }
}

pub async fn execute<D, C>(
    controller: &WorkflowController<D, C>,
    command: Command,
) -> Result<Outcome, String>
where
    D: Diagnose + 'static,
    C: TreatmentCatalog + 'static,
{
    let message = match command {
        Command::Capture(path) => {
            let image = acquire_image(&path).map_err(|e| e.to_string())?;
            controller.capture(image).await.map_err(|e| e.to_string())?;
            controller.current_view().await.to_string()
        }
        Command::Wait => {
            controller
                .wait_for_analysis()
                .await
                .map_err(|e| e.to_string())?;
            controller.current_view().await.to_string()
        }
        Command::Go(page) => {
            controller.navigate(page).await.map_err(|e| e.to_string())?;
            controller.current_view().await.to_string()
        }
        Command::Field(input) => {
            controller.set_field_size(&input).await;
            controller.current_view().await.to_string()
        }
        Command::Select(id) => {
            controller
                .select_treatment(&id)
                .await
                .map_err(|e| e.to_string())?;
            controller.current_view().await.to_string()
        }
        Command::Compare(id) => {
            let compared = controller
                .toggle_compare(&id)
                .await
                .map_err(|e| e.to_string())?;
            if compared {
                format!("{id} added to comparison")
            } else {
                format!("{id} not in comparison")
            }
        }
        Command::Schedule {
            treatment_id,
            start,
        } => {
            let start = start.unwrap_or_else(|| controller.today().to_string());
            let entry = controller
                .schedule_treatment(&treatment_id, &start)
                .await
                .map_err(|e| e.to_string())?;
            format!(
                "{} scheduled from {}; next application {}",
                entry.treatment_name, entry.start_date, entry.next_application_date
            )
        }
        Command::Photo(path) => {
            let photo = acquire_image(&path).map_err(|e| e.to_string())?;
            let count = controller.record_progress_photo(photo).await;
            format!("{count} progress photo(s) recorded")
        }
        Command::Mode => {
            let mode = controller.toggle_mode().map_err(|e| e.to_string())?;
            format!("{:?} mode: {}", mode, mode.status_message())
        }
        Command::View => controller.current_view().await.to_string(),
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Outcome::Quit),
    };

    Ok(Outcome::Continue(message))
}
