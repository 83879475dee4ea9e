//! Interactive editing shell over a [`Session`].
//!
//! A line-command loop standing in for the form: edit fields, watch the
//! ratio, back-solve a field, undo the solve.

use std::io::{self, BufRead, Write};

use kpical_core::Record;
use kpical_engine::{FieldOf, Formula, Session};
use tracing::info;

use crate::display;

/// A parsed shell line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// `set <field> <value>`
    Set {
        /// Field name as typed.
        field: String,
        /// New value.
        value: f64,
    },
    /// `step <field> up|down`
    Step {
        /// Field name as typed.
        field: String,
        /// Direction.
        up: bool,
    },
    /// `kpi`
    Kpi,
    /// `show`
    Show,
    /// `solve <field>`
    Solve {
        /// Field name as typed.
        field: String,
    },
    /// `undo`
    Undo,
    /// `fields`
    Fields,
    /// `help`
    Help,
    /// `quit` / `exit`
    Quit,
    /// Blank line.
    Empty,
}

/// Parse one shell line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Empty);
    };
    let command = match verb {
        "set" => {
            let field = words.next().ok_or("usage: set <field> <value>")?;
            let value = words.next().ok_or("usage: set <field> <value>")?;
            let value: f64 = value
                .parse()
                .map_err(|_| format!("not a number: {}", value))?;
            Command::Set {
                field: field.to_string(),
                value,
            }
        }
        "step" => {
            let field = words.next().ok_or("usage: step <field> up|down")?;
            let up = match words.next() {
                Some("up") => true,
                Some("down") => false,
                _ => return Err("usage: step <field> up|down".to_string()),
            };
            Command::Step {
                field: field.to_string(),
                up,
            }
        }
        "kpi" => Command::Kpi,
        "show" => Command::Show,
        "solve" => {
            let field = words.next().ok_or("usage: solve <field>")?;
            Command::Solve {
                field: field.to_string(),
            }
        }
        "undo" => Command::Undo,
        "fields" => Command::Fields,
        "help" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command: {} (try help)", other)),
    };
    if words.next().is_some() {
        return Err(format!("trailing input after {}", verb));
    }
    Ok(command)
}

/// Run the shell until `quit` or end of input.
pub fn run<F: Formula>(mut session: Session<F>) -> io::Result<()> {
    info!("interactive session started");
    let stdin = io::stdin();
    let mut out = io::stdout();
    let mut line = String::new();

    show(&session, &mut out)?;
    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(());
        }
        match parse_command(&line) {
            Ok(command) => {
                if !execute(&mut session, &command, &mut out)? {
                    return Ok(());
                }
            }
            Err(message) => writeln!(out, "{}", message)?,
        }
    }
}

/// Apply one command. Returns `false` when the shell should exit.
fn execute<F: Formula>(
    session: &mut Session<F>,
    command: &Command,
    out: &mut impl Write,
) -> io::Result<bool> {
    match command {
        Command::Set { field, value } => match field.parse::<FieldOf<F>>() {
            Ok(field) => {
                session.set(field, *value);
                kpi_line(session, out)?;
            }
            Err(err) => writeln!(out, "{}", err)?,
        },
        Command::Step { field, up } => match field.parse::<FieldOf<F>>() {
            Ok(field) => {
                let current = session.metrics().get(field);
                if *up {
                    session.set(field, current + 1.0);
                } else if current > 1.0 {
                    // The stepper floor: never below one.
                    session.set(field, current - 1.0);
                }
                kpi_line(session, out)?;
            }
            Err(err) => writeln!(out, "{}", err)?,
        },
        Command::Kpi => kpi_line(session, out)?,
        Command::Show => show(session, out)?,
        Command::Solve { field } => match field.parse::<FieldOf<F>>() {
            Ok(field) => {
                let previous = session.metrics().get(field);
                match session.solve(field) {
                    Some(metrics) => {
                        let solved = metrics.get(field);
                        writeln!(
                            out,
                            "{}: {} (was {})",
                            field,
                            display::format_value(solved),
                            display::format_value(previous)
                        )?;
                        kpi_line(session, out)?;
                    }
                    None => writeln!(out, "{} cannot be back-solved here", field)?,
                }
            }
            Err(err) => writeln!(out, "{}", err)?,
        },
        Command::Undo => match session.undo() {
            Some(field) => {
                writeln!(out, "undid solve of {}", field)?;
                kpi_line(session, out)?;
            }
            None => writeln!(out, "nothing to undo")?,
        },
        Command::Fields => {
            for &field in <F::Metrics as Record>::FIELDS {
                let marker = if session.formula().targets().contains(&field) {
                    "  (solvable)"
                } else {
                    ""
                };
                writeln!(out, "{}{}", field, marker)?;
            }
        }
        Command::Help => {
            writeln!(out, "commands:")?;
            writeln!(out, "  set <field> <value>   edit a field")?;
            writeln!(out, "  step <field> up|down  nudge a field by one")?;
            writeln!(out, "  kpi                   print the current ratio")?;
            writeln!(out, "  show                  print every field")?;
            writeln!(out, "  solve <field>         back-solve a field onto the threshold")?;
            writeln!(out, "  undo                  restore the record from before the last solve")?;
            writeln!(out, "  fields                list fields and solve targets")?;
            writeln!(out, "  quit                  leave")?;
        }
        Command::Quit => return Ok(false),
        Command::Empty => {}
    }
    Ok(true)
}

fn kpi_line<F: Formula>(session: &Session<F>, out: &mut impl Write) -> io::Result<()> {
    let verdict = if session.kpi_hint().is_alert() {
        "over threshold"
    } else {
        "ok"
    };
    writeln!(
        out,
        "KPI: {} [{}]",
        display::format_ratio(session.kpi()),
        verdict
    )
}

fn show<F: Formula>(session: &Session<F>, out: &mut impl Write) -> io::Result<()> {
    for &field in <F::Metrics as Record>::FIELDS {
        let flag = if session.metrics().hint(field).is_alert() {
            " !"
        } else {
            ""
        };
        writeln!(
            out,
            "{:18} {}{}",
            field.to_string(),
            display::format_value(session.metrics().get(field)),
            flag
        )?;
    }
    kpi_line(session, out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kpical_core::{Field, Metrics};
    use kpical_engine::ClassicFormula;

    fn session() -> Session<ClassicFormula> {
        let metrics = Metrics {
            cost: 1_100_500.0,
            expenses: 0.0,
            workers: 10,
            avg_views: 10_000.0,
            avg_duration: 22.5,
        };
        Session::new(ClassicFormula::new(), metrics)
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            parse_command("set cost 1000"),
            Ok(Command::Set {
                field: "cost".to_string(),
                value: 1000.0
            })
        );
        assert_eq!(
            parse_command("step workers up"),
            Ok(Command::Step {
                field: "workers".to_string(),
                up: true
            })
        );
        assert_eq!(parse_command("kpi"), Ok(Command::Kpi));
        assert_eq!(
            parse_command("solve avg-views"),
            Ok(Command::Solve {
                field: "avg-views".to_string()
            })
        );
        assert_eq!(parse_command("undo"), Ok(Command::Undo));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
        assert_eq!(parse_command("   "), Ok(Command::Empty));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_command("set cost").is_err());
        assert!(parse_command("set cost ten").is_err());
        assert!(parse_command("step workers sideways").is_err());
        assert!(parse_command("frobnicate").is_err());
        assert!(parse_command("kpi now").is_err());
    }

    #[test]
    fn test_execute_solve_and_undo() {
        let mut session = session();
        let mut out = Vec::new();

        let command = Command::Solve {
            field: "expenses".to_string(),
        };
        assert!(execute(&mut session, &command, &mut out).unwrap());
        assert!(session.metrics().expenses > 0.0);
        assert_eq!(session.last_solved(), Some(Field::Expenses));

        assert!(execute(&mut session, &Command::Undo, &mut out).unwrap());
        assert_eq!(session.metrics().expenses, 0.0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("expenses"));
        assert!(text.contains("undid solve of expenses"));
    }

    #[test]
    fn test_execute_step_respects_floor() {
        let mut session = session();
        let mut out = Vec::new();

        let down = Command::Step {
            field: "workers".to_string(),
            up: false,
        };
        for _ in 0..20 {
            execute(&mut session, &down, &mut out).unwrap();
        }
        assert_eq!(session.metrics().workers, 1);
    }

    #[test]
    fn test_execute_unknown_field_reports() {
        let mut session = session();
        let mut out = Vec::new();

        let command = Command::Set {
            field: "views".to_string(),
            value: 1.0,
        };
        assert!(execute(&mut session, &command, &mut out).unwrap());

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("unknown field: views"));
    }

    #[test]
    fn test_quit_stops_loop() {
        let mut session = session();
        let mut out = Vec::new();
        assert!(!execute(&mut session, &Command::Quit, &mut out).unwrap());
    }
}
