//! Line-oriented form entry for `qa report fill` and `qa case fill`.

use crate::case_form::InternalCaseForm;
use crate::error::ConsoleResult;
use crate::form::{QaReportForm, TUTORIAL_STEPS};
use crate::item::TestItemEditor;
use attachments::Attachment;
use std::io::{self, BufRead, Write};
use std::path::Path;
use store::{CaseSection, LeaderboardType, TestItem, TestStatus};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        writeln!(self.output, "{}", line.as_ref())
    }

    /// Read one trimmed answer. End of input reads as an empty answer.
    pub fn ask(&mut self, prompt: &str, current: &str) -> io::Result<String> {
        if current.is_empty() {
            write!(self.output, "{}: ", prompt)?;
        } else {
            write!(self.output, "{} [{}]: ", prompt, current)?;
        }
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }

    /// Like `ask`, but an empty answer keeps `current`.
    fn ask_or_keep(&mut self, prompt: &str, current: &str) -> io::Result<String> {
        let answer = self.ask(prompt, current)?;
        Ok(if answer.is_empty() {
            current.to_string()
        } else {
            answer
        })
    }

    fn ask_status(&mut self, prompt: &str, current: TestStatus) -> io::Result<TestStatus> {
        loop {
            let answer = self.ask(&format!("{} (p/f/n)", prompt), current.as_str())?;
            if answer.is_empty() {
                return Ok(current);
            }
            match answer.parse() {
                Ok(status) => return Ok(status),
                Err(e) => self.say(e)?,
            }
        }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// Walk through the onboarding steps until finished or skipped.
pub fn show_tutorial<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    form: &mut QaReportForm,
) -> io::Result<()> {
    while let Some(step) = form.tutorial().current() {
        let index = form.tutorial().step_index();
        prompter.say(format!(
            "\n[{}/{}] {}\n{}",
            index + 1,
            TUTORIAL_STEPS.len(),
            step.title,
            step.content
        ))?;

        let hint = if form.tutorial().is_last_step() {
            "Enter to finish, b back, s skip"
        } else {
            "Enter for next, b back, s skip"
        };
        match prompter.ask(hint, "")?.as_str() {
            "s" | "skip" => form.tutorial_mut().dismiss(),
            "b" | "back" => form.tutorial_mut().back(),
            _ => form.tutorial_mut().advance(),
        }
    }
    Ok(())
}

pub fn fill_report_form<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    form: &mut QaReportForm,
) -> ConsoleResult<()> {
    show_tutorial(prompter, form)?;

    prompter.say("\nBasic Information")?;
    let name = prompter.ask_or_keep("Tester name", form.tester_name())?;
    form.set_tester_name(name);

    loop {
        let current = form
            .test_date()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let date = prompter.ask_or_keep("Test date (YYYY-MM-DD)", &current)?;
        match form.set_test_date_str(&date) {
            Ok(()) => break,
            Err(e) => prompter.say(e)?,
        }
    }

    let version = prompter.ask_or_keep("Application version", form.application_version())?;
    form.set_application_version(version);
    let env = prompter.ask_or_keep("Environment (optional)", form.test_environment())?;
    form.set_test_environment(env);

    let mut group = "";
    for item in TestItem::ALL {
        if item.group() != group {
            group = item.group();
            prompter.say(format!("\n{}", group))?;
        }

        let mut editor = TestItemEditor::new(item, form);
        let status = prompter.ask_status(item.label(), form.result(item).status.clone())?;
        editor.set_status(form, status);

        let notes = prompter.ask_or_keep("  Notes", editor.notes())?;
        editor.edit_notes(notes);
        editor.blur(form);

        if item == TestItem::Leaderboard {
            loop {
                let current = form.leaderboard_type().as_str();
                let answer = prompter.ask("  Leaderboard type (only/full)", current)?;
                if answer.is_empty() {
                    break;
                }
                match answer.parse::<LeaderboardType>() {
                    Ok(kind) => {
                        form.set_leaderboard_type(kind);
                        break;
                    }
                    Err(e) => prompter.say(e)?,
                }
            }
        }
    }
    Ok(())
}

pub fn fill_case_form<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    form: &mut InternalCaseForm,
    base_dir: &Path,
) -> ConsoleResult<()> {
    let name = prompter.ask_or_keep("Test name", form.test_name())?;
    form.set_test_name(name);

    for section in CaseSection::ALL {
        prompter.say(format!("\n{}", section))?;
        let current = form.section(section).map(|s| s.status.clone()).unwrap_or_default();
        let status = prompter.ask_status("Status", current)?;
        form.set_status(section, status);

        let text = prompter.ask("Text feedback", "")?;
        if !text.is_empty() {
            form.set_text_feedback(section, text);
        }

        loop {
            let image = prompter.ask("Screenshot path (optional)", "")?;
            if image.is_empty() {
                break;
            }
            match Attachment::load(&base_dir.join(&image)) {
                Ok(attachment) => {
                    form.attach_image(section, attachment);
                    break;
                }
                Err(e) => prompter.say(format!("Cannot attach {}: {}", image, e))?,
            }
        }

        let notes = prompter.ask("Additional notes", "")?;
        if !notes.is_empty() {
            form.set_feedback(section, notes);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn test_tutorial_back_and_skip() {
        let mut form = QaReportForm::new();
        let mut p = prompter("\nb\n\ns\n");
        show_tutorial(&mut p, &mut form).unwrap();
        assert!(!form.tutorial().is_visible());

        let (_, out) = p.into_inner();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("[1/5] Welcome to QA Testing Form"));
        assert!(out.contains("[2/5] Basic Information"));
    }

    #[test]
    fn test_fill_report_form() {
        // skip tutorial, header, then register=pass with notes, login=fail, the rest defaulted
        let mut script = String::from("s\nAlice\n\n\nstaging\np\nworks\nf\n\n");
        script.push_str(&"\n".repeat(64));

        let mut form = QaReportForm::new();
        let mut p = prompter(&script);
        fill_report_form(&mut p, &mut form).unwrap();

        assert_eq!(form.tester_name(), "Alice");
        assert_eq!(form.application_version(), "v2.7.9");
        assert_eq!(form.test_environment(), "staging");
        assert_eq!(form.result(TestItem::Register).status, TestStatus::Pass);
        assert_eq!(form.result(TestItem::Register).notes, "works");
        assert_eq!(form.result(TestItem::Login).status, TestStatus::Fail);
        assert_eq!(form.result(TestItem::UserProfile).status, TestStatus::NotTested);
        assert!(form.check().is_ok());
    }

    #[test]
    fn test_invalid_status_reprompts() {
        let mut p = prompter("maybe\npass\n");
        let status = p.ask_status("Login", TestStatus::NotTested).unwrap();
        assert_eq!(status, TestStatus::Pass);
    }

    #[test]
    fn test_fill_case_form() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut script = String::from("Smoke\np\nhero ok\n\n\n");
        script.push_str(&"\n".repeat(40));

        let mut form = InternalCaseForm::new();
        let mut p = prompter(&script);
        fill_case_form(&mut p, &mut form, dir.path()).unwrap();

        assert_eq!(form.test_name(), "Smoke");
        let home = form.section(CaseSection::Homepage).unwrap();
        assert_eq!(home.status, TestStatus::Pass);
        assert_eq!(home.text_feedback, "hero ok");
        assert!(home.image.is_none());
    }
}
