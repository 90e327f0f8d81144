use inquire::{InquireError, Text};
use weatherapp_core::{Location, LocationPrompt, Result, WeatherError};

const PER_LINE: usize = 5;

/// Terminal prompt used by `weatherapp config <provider>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct InquirePrompt;

impl LocationPrompt for InquirePrompt {
    fn show(&mut self, candidates: &[Location]) {
        for line in menu_lines(candidates) {
            println!("{line}");
        }
    }

    fn read_selection(&mut self) -> Result<String> {
        Text::new("Please select location:").prompt().map_err(|err| match err {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                WeatherError::Prompt("selection cancelled".to_string())
            }
            other => WeatherError::Prompt(other.to_string()),
        })
    }

    fn report(&mut self, error: &WeatherError) {
        eprintln!("{error}. Try again.");
    }
}

/// Numbered candidates, five per line.
fn menu_lines(candidates: &[Location]) -> Vec<String> {
    let entries: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(index, location)| format!("{}) {}", index + 1, location.name))
        .collect();

    entries.chunks(PER_LINE).map(|chunk| chunk.join("  ")).collect()
}
