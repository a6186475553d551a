use crate::ast::{Expr, Position, Stmt};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::stage::Stage;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bool(b) => *b,
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Value::Str(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeError {
    pub message: String,
    pub pos: Position,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (line {}, column {})",
            self.message, self.pos.line, self.pos.column
        )
    }
}

impl Error for RuntimeError {}

#[derive(Debug, Clone, Default)]
pub struct KeyState {
    pressed: HashMap<String, bool>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: impl Into<String>) {
        self.pressed.insert(key.into(), true);
    }

    pub fn release(&mut self, key: &str) {
        self.pressed.insert(key.to_string(), false);
    }

    pub fn is_down(&self, key: &str) -> bool {
        self.pressed.get(key).copied().unwrap_or(false)
    }
}

// One sandbox per run. The key map belongs to the session, so repeated runs
// never observe each other's input state.
pub struct Sandbox<'a> {
    stage: &'a mut dyn Stage,
    width: f64,
    height: f64,
    keys: KeyState,
    vars: HashMap<String, Value>,
}

impl<'a> Sandbox<'a> {
    pub fn new(stage: &'a mut dyn Stage, width: f64, height: f64) -> Self {
        Self {
            stage,
            width,
            height,
            keys: KeyState::new(),
            vars: HashMap::new(),
        }
    }

    pub fn keys_mut(&mut self) -> &mut KeyState {
        &mut self.keys
    }

    pub fn run(&mut self, source: &str) -> Result<(), RuntimeError> {
        // Compiled fresh on every run; nothing is cached between invocations.
        let tokens = Lexer::new(source).tokenize().map_err(|e| RuntimeError {
            message: e.message,
            pos: e.pos,
        })?;
        let program = Parser::new(tokens)
            .parse_program()
            .map_err(|e| RuntimeError {
                message: e.message,
                pos: e.pos,
            })?;
        self.vars.clear();
        self.exec_body(&program)
    }

    fn exec_body(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        for stmt in statements {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval(value)?;
                self.vars.insert(name.clone(), value);
            }
            Stmt::Assign { pos, name, value } => {
                if !self.vars.contains_key(name) {
                    return Err(RuntimeError {
                        message: format!("'{}' is not defined", name),
                        pos: *pos,
                    });
                }
                let value = self.eval(value)?;
                self.vars.insert(name.clone(), value);
            }
            Stmt::MemberAssign {
                pos,
                target,
                property,
                value,
            } => {
                if target != "stage" {
                    return Err(RuntimeError {
                        message: format!("'{}' is not defined", target),
                        pos: *pos,
                    });
                }
                let value = self.eval(value)?;
                let style = value.to_display_string();
                match property.as_str() {
                    "fillStyle" => self.stage.set_fill_style(&style),
                    "strokeStyle" => self.stage.set_stroke_style(&style),
                    other => {
                        return Err(RuntimeError {
                            message: format!("stage has no property '{}'", other),
                            pos: *pos,
                        });
                    }
                }
            }
            Stmt::Expr { expr, .. } => {
                self.eval(expr)?;
            }
            Stmt::If {
                condition,
                then_body,
                else_body,
                ..
            } => {
                if self.eval(condition)?.truthy() {
                    self.exec_body(then_body)?;
                } else {
                    self.exec_body(else_body)?;
                }
            }
            Stmt::While {
                condition, body, ..
            } => {
                // No step budget and no timeout: an unbounded loop runs until
                // the embedder kills the process.
                while self.eval(condition)?.truthy() {
                    self.exec_body(body)?;
                }
            }
        }
        Ok(())
    }

    fn eval(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number { value, .. } => Ok(Value::Number(*value)),
            Expr::String { value, .. } => Ok(Value::Str(value.clone())),
            Expr::Bool { value, .. } => Ok(Value::Bool(*value)),
            Expr::Var { pos, name } => self.lookup(name, *pos),
            Expr::Index { pos, target, index } => {
                if target != "keys" {
                    return Err(RuntimeError {
                        message: format!("'{}' cannot be indexed", target),
                        pos: *pos,
                    });
                }
                let key = self.eval(index)?.to_display_string();
                Ok(Value::Bool(self.keys.is_down(&key)))
            }
            Expr::Call { pos, name, args } => self.call(name, args, *pos),
            Expr::MemberCall {
                pos,
                target,
                method,
                args,
            } => self.member_call(target, method, args, *pos),
            Expr::Unary { pos, op, operand } => {
                let value = self.eval(operand)?;
                match op.as_str() {
                    "-" => Ok(Value::Number(-self.expect_number(value, *pos)?)),
                    "!" => Ok(Value::Bool(!value.truthy())),
                    other => Err(RuntimeError {
                        message: format!("unknown unary operator '{}'", other),
                        pos: *pos,
                    }),
                }
            }
            Expr::Binary {
                pos,
                op,
                left,
                right,
            } => self.eval_binary(op, left, right, *pos),
        }
    }

    fn eval_binary(
        &mut self,
        op: &str,
        left: &Expr,
        right: &Expr,
        pos: Position,
    ) -> Result<Value, RuntimeError> {
        if op == "&&" {
            let lhs = self.eval(left)?;
            if !lhs.truthy() {
                return Ok(Value::Bool(false));
            }
            return Ok(Value::Bool(self.eval(right)?.truthy()));
        }
        if op == "||" {
            let lhs = self.eval(left)?;
            if lhs.truthy() {
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(self.eval(right)?.truthy()));
        }

        let lhs = self.eval(left)?;
        let rhs = self.eval(right)?;
        match op {
            "+" => {
                if matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_)) {
                    return Ok(Value::Str(format!(
                        "{}{}",
                        lhs.to_display_string(),
                        rhs.to_display_string()
                    )));
                }
                Ok(Value::Number(
                    self.expect_number(lhs, pos)? + self.expect_number(rhs, pos)?,
                ))
            }
            "-" => Ok(Value::Number(
                self.expect_number(lhs, pos)? - self.expect_number(rhs, pos)?,
            )),
            "*" => Ok(Value::Number(
                self.expect_number(lhs, pos)? * self.expect_number(rhs, pos)?,
            )),
            "/" | "%" => {
                let a = self.expect_number(lhs, pos)?;
                let b = self.expect_number(rhs, pos)?;
                if b == 0.0 {
                    return Err(RuntimeError {
                        message: "division by zero".to_string(),
                        pos,
                    });
                }
                Ok(Value::Number(if op == "/" { a / b } else { a % b }))
            }
            "==" => Ok(Value::Bool(lhs == rhs)),
            "!=" => Ok(Value::Bool(lhs != rhs)),
            "<" | "<=" | ">" | ">=" => {
                let a = self.expect_number(lhs, pos)?;
                let b = self.expect_number(rhs, pos)?;
                let result = match op {
                    "<" => a < b,
                    "<=" => a <= b,
                    ">" => a > b,
                    _ => a >= b,
                };
                Ok(Value::Bool(result))
            }
            other => Err(RuntimeError {
                message: format!("unknown operator '{}'", other),
                pos,
            }),
        }
    }

    fn lookup(&self, name: &str, pos: Position) -> Result<Value, RuntimeError> {
        if let Some(value) = self.vars.get(name) {
            return Ok(value.clone());
        }
        match name {
            "width" => Ok(Value::Number(self.width)),
            "height" => Ok(Value::Number(self.height)),
            _ => Err(RuntimeError {
                message: format!("'{}' is not defined", name),
                pos,
            }),
        }
    }

    fn call(&mut self, name: &str, args: &[Expr], pos: Position) -> Result<Value, RuntimeError> {
        match name {
            "clear" => {
                self.expect_arity(name, args, 0, pos)?;
                self.stage.clear();
                Ok(Value::Bool(true))
            }
            "keyDown" => {
                self.expect_arity(name, args, 1, pos)?;
                let key = self.eval(&args[0])?.to_display_string();
                Ok(Value::Bool(self.keys.is_down(&key)))
            }
            other => Err(RuntimeError {
                message: format!("'{}' is not defined", other),
                pos,
            }),
        }
    }

    fn member_call(
        &mut self,
        target: &str,
        method: &str,
        args: &[Expr],
        pos: Position,
    ) -> Result<Value, RuntimeError> {
        if target != "stage" {
            return Err(RuntimeError {
                message: format!("'{}' is not defined", target),
                pos,
            });
        }
        match method {
            "fillRect" | "strokeRect" | "clearRect" => {
                self.expect_arity(method, args, 4, pos)?;
                let mut nums = [0.0f64; 4];
                for (slot, arg) in nums.iter_mut().zip(args) {
                    let value = self.eval(arg)?;
                    *slot = self.expect_number(value, pos)?;
                }
                let [x, y, w, h] = nums;
                match method {
                    "fillRect" => self.stage.fill_rect(x, y, w, h),
                    "strokeRect" => self.stage.stroke_rect(x, y, w, h),
                    _ => self.stage.clear_rect(x, y, w, h),
                }
                Ok(Value::Bool(true))
            }
            "fillText" => {
                self.expect_arity(method, args, 3, pos)?;
                let text = self.eval(&args[0])?.to_display_string();
                let x_value = self.eval(&args[1])?;
                let y_value = self.eval(&args[2])?;
                let x = self.expect_number(x_value, pos)?;
                let y = self.expect_number(y_value, pos)?;
                self.stage.fill_text(&text, x, y);
                Ok(Value::Bool(true))
            }
            other => Err(RuntimeError {
                message: format!("stage has no method '{}'", other),
                pos,
            }),
        }
    }

    fn expect_arity(
        &self,
        name: &str,
        args: &[Expr],
        expected: usize,
        pos: Position,
    ) -> Result<(), RuntimeError> {
        if args.len() != expected {
            return Err(RuntimeError {
                message: format!(
                    "{} expects {} argument(s), got {}",
                    name,
                    expected,
                    args.len()
                ),
                pos,
            });
        }
        Ok(())
    }

    fn expect_number(&self, value: Value, pos: Position) -> Result<f64, RuntimeError> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(RuntimeError {
                message: format!("expected a number, got {}", other.type_name()),
                pos,
            }),
        }
    }
}
