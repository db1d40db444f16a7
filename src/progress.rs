// Released under MIT License.
// Copyright (c) 2026 ensa_rs developers

//! Implementation of ProgressPrinter structure for printing the progress of trajectory reading.

use colored::{ColoredString, Colorize};
use std::io::Write;

/// Progress of trajectory reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressStatus {
    /// Trajectory reading is in progress.
    Running,
    /// Trajectory has been read completely.
    Completed,
    /// Trajectory reading failed.
    Failed,
}

/// Structure handling printing of progress of reading a trajectory file.
pub struct ProgressPrinter {
    /// Stream to write the progress info to.
    output: Box<dyn Write>,
    /// Current status of reading. Default: ProgressStatus::Running.
    status: ProgressStatus,
    /// Frequency of printing. Print every `print_freq`th frame. Default: 100 frames.
    print_freq: usize,
    /// If true, the output will be colored. Default: true.
    colored: bool,
}

impl ProgressPrinter {
    /// Create an instance of `ProgressPrinter` with default parameters.
    ///
    /// Defaults: printing to standard output, every 100 frames, colored.
    pub fn new() -> Self {
        ProgressPrinter {
            output: Box::from(std::io::stdout()),
            status: ProgressStatus::Running,
            print_freq: 100,
            colored: true,
        }
    }

    /// Create an instance of `ProgressPrinter` with a custom output stream.
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    /// Create an instance of `ProgressPrinter` with a custom printing frequency.
    pub fn with_print_freq(mut self, print_freq: usize) -> Self {
        self.print_freq = print_freq;
        self
    }

    /// Create an instance of `ProgressPrinter` with colored output enabled or disabled.
    pub fn with_colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Set the status of the `ProgressPrinter`.
    pub fn set_status(&mut self, status: ProgressStatus) {
        self.status = status;
    }

    /// Print progress info for the given frame.
    ///
    /// For `Running` status, only every `print_freq`th frame is reported.
    /// Terminal statuses are always reported and end with a newline.
    pub fn print(&mut self, frame: usize, step: u64, time: f32) {
        if self.status == ProgressStatus::Running && frame % self.print_freq != 0 {
            return;
        }

        let result = if self.colored {
            write!(
                self.output,
                "[{: ^9}]   {} {:12} | {} {:12} ps\r",
                self.status_message(),
                "Step".cyan(),
                step,
                "Time".bright_purple(),
                time as u64,
            )
        } else {
            write!(
                self.output,
                "[{: ^9}]   Step {:12} | Time {:12} ps\r",
                self.status_word(),
                step,
                time as u64,
            )
        };

        result.expect(
            "FATAL ENSA ERROR | ProgressPrinter::print | Could not write to progress stream.",
        );

        if self.status != ProgressStatus::Running {
            writeln!(self.output).expect(
                "FATAL ENSA ERROR | ProgressPrinter::print | Could not write to progress stream.",
            );
        }

        self.output.flush().expect(
            "FATAL ENSA ERROR | ProgressPrinter::print | Could not flush progress stream.",
        );
    }

    fn status_word(&self) -> &'static str {
        match self.status {
            ProgressStatus::Running => "RUNNING",
            ProgressStatus::Completed => "COMPLETED",
            ProgressStatus::Failed => "FAILED!",
        }
    }

    fn status_message(&self) -> ColoredString {
        match self.status {
            ProgressStatus::Running => self.status_word().yellow(),
            ProgressStatus::Completed => self.status_word().green(),
            ProgressStatus::Failed => self.status_word().red(),
        }
    }
}

impl Default for ProgressPrinter {
    fn default() -> Self {
        Self::new()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
