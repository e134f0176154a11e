// Structured program tree produced by the visual editor's compiler.

use crate::domain::command::Command;
use crate::domain::systems::sensors::{SensorKind, Unit};
use std::fmt;

/// Upper bound on a pre-expanded command sequence.
pub const MAX_EXPANDED_COMMANDS: usize = 10_000;

/// Upper bound on statements visited (loop iterations included) while expanding.
pub const MAX_EXPANSION_STEPS: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Number(f32),
    Sensor { kind: SensorKind, unit: Unit },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CompareOp {
    pub fn apply(self, left: f32, right: f32) -> bool {
        match self {
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Constant(bool),
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Not(Box<Condition>),
    All(Vec<Condition>),
    Any(Vec<Condition>),
}

impl Condition {
    pub fn evaluate(&self, read: &mut dyn FnMut(SensorKind, Unit) -> f32) -> bool {
        match self {
            Condition::Constant(value) => *value,
            Condition::Compare { left, op, right } => {
                let l = operand_value(left, read);
                let r = operand_value(right, read);
                op.apply(l, r)
            }
            Condition::Not(inner) => !inner.evaluate(read),
            Condition::All(items) => items.iter().all(|c| c.evaluate(read)),
            Condition::Any(items) => items.iter().any(|c| c.evaluate(read)),
        }
    }
}

fn operand_value(operand: &Operand, read: &mut dyn FnMut(SensorKind, Unit) -> f32) -> f32 {
    match operand {
        Operand::Number(value) => *value,
        Operand::Sensor { kind, unit } => read(*kind, *unit),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Command(Command),
    Repeat { times: u32, body: Vec<Stmt> },
    While { condition: Condition, body: Vec<Stmt> },
    Forever { body: Vec<Stmt> },
    If {
        condition: Condition,
        then: Vec<Stmt>,
        otherwise: Vec<Stmt>,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// `while`/`forever` loops depend on live state and cannot be pre-expanded.
    UnboundedLoop,
    TooManyCommands,
    /// Expansion visited too many statements without finishing.
    TooComplex,
    Empty,
}

impl fmt::Display for ProgramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramError::UnboundedLoop => write!(f, "program contains an unbounded loop"),
            ProgramError::TooManyCommands => write!(
                f,
                "program expands to more than {MAX_EXPANDED_COMMANDS} commands"
            ),
            ProgramError::TooComplex => write!(
                f,
                "program needs more than {MAX_EXPANSION_STEPS} steps to expand"
            ),
            ProgramError::Empty => write!(f, "program has no commands"),
        }
    }
}

impl std::error::Error for ProgramError {}

impl Program {
    pub fn new(body: Vec<Stmt>) -> Self {
        Self { body }
    }

    /// True when the program has loops whose exit depends on live sensor state.
    pub fn requires_live(&self) -> bool {
        fn any_unbounded(stmts: &[Stmt]) -> bool {
            stmts.iter().any(|stmt| match stmt {
                Stmt::Command(_) => false,
                Stmt::While { .. } | Stmt::Forever { .. } => true,
                Stmt::Repeat { body, .. } => any_unbounded(body),
                Stmt::If {
                    then, otherwise, ..
                } => any_unbounded(then) || any_unbounded(otherwise),
            })
        }
        any_unbounded(&self.body)
    }

    /// Flattens the tree into a batch sequence. Conditions are decided now,
    /// against whatever `read` reports, not when the commands later run.
    pub fn expand(
        &self,
        mut read: impl FnMut(SensorKind, Unit) -> f32,
    ) -> Result<Vec<Command>, ProgramError> {
        let mut expansion = Expansion {
            read: &mut read,
            out: Vec::new(),
            steps: 0,
        };
        expansion.block(&self.body)?;
        if expansion.out.is_empty() {
            return Err(ProgramError::Empty);
        }
        Ok(expansion.out)
    }
}

/// True if running `stmts` could ever produce a command.
fn can_emit(stmts: &[Stmt]) -> bool {
    stmts.iter().any(|stmt| match stmt {
        Stmt::Command(_) => true,
        // Unbounded loops must reach the expander so it can reject them.
        Stmt::While { .. } | Stmt::Forever { .. } => true,
        Stmt::Repeat { times, body } => *times > 0 && can_emit(body),
        Stmt::If {
            then, otherwise, ..
        } => can_emit(then) || can_emit(otherwise),
    })
}

struct Expansion<'r> {
    read: &'r mut dyn FnMut(SensorKind, Unit) -> f32,
    out: Vec<Command>,
    steps: usize,
}

impl Expansion<'_> {
    fn step(&mut self) -> Result<(), ProgramError> {
        self.steps += 1;
        if self.steps > MAX_EXPANSION_STEPS {
            return Err(ProgramError::TooComplex);
        }
        Ok(())
    }

    fn block(&mut self, stmts: &[Stmt]) -> Result<(), ProgramError> {
        for stmt in stmts {
            self.step()?;
            match stmt {
                Stmt::Command(command) => {
                    if self.out.len() >= MAX_EXPANDED_COMMANDS {
                        return Err(ProgramError::TooManyCommands);
                    }
                    self.out.push(command.clone());
                }
                Stmt::Repeat { times, body } => {
                    if !can_emit(body) {
                        continue;
                    }
                    for _ in 0..*times {
                        self.step()?;
                        self.block(body)?;
                    }
                }
                Stmt::If {
                    condition,
                    then,
                    otherwise,
                } => {
                    let branch = if condition.evaluate(&mut *self.read) {
                        then
                    } else {
                        otherwise
                    };
                    self.block(branch)?;
                }
                Stmt::While { .. } | Stmt::Forever { .. } => {
                    return Err(ProgramError::UnboundedLoop);
                }
            }
        }
        Ok(())
    }
}
