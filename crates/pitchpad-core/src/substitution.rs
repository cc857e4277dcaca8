//! Live token substitution.
//!
//! The host recomputes named values (the fee earner's role, their hourly
//! rate) whenever upstream business data changes; the engine rewrites the
//! matching tokens in the text and reports where the written values now
//! sit, so the store can highlight them as auto-inserted.
//!
//! Two properties shape the implementation:
//! - **Idempotence**: a run is keyed on `(role, rate, text)`; re-running
//!   with the same key does nothing and fires no update.
//! - **Span memory**: the engine remembers each substitution it applied,
//!   remapped through later edits, so a changed value rewrites the same
//!   spot in place instead of hunting for a token that no longer exists.
//!
//! Replacements inside one pass run left-to-right with an accumulating
//! shift, since each splice moves everything after it.

use tracing::debug;

use pitchpad_text::{char_to_byte, merge_spans, DiffWindow, Span};

use crate::config::SubstitutionConfig;

/// Named values supplied by the host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionValues {
    /// Fee earner role, used verbatim. Empty or missing means
    /// unavailable.
    pub role: Option<String>,
    /// Raw hourly rate as the host holds it. Non-numeric means
    /// unavailable.
    pub rate: Option<String>,
}

/// Which token a substitution belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Rate,
    Role,
}

/// One substitution the engine has written into the text.
#[derive(Debug, Clone)]
struct Applied {
    kind: TokenKind,
    span: Span,
    /// The formatted value currently sitting in the span.
    value: String,
}

/// The outcome of one engine run.
#[derive(Debug, Clone)]
pub struct SubstitutionOutcome {
    /// The text after all rewrites (unchanged if none fired).
    pub text: String,
    /// Where substituted values now sit; the new AutoInsert set.
    pub spans: Vec<Span>,
    /// The edit windows applied, in order, for remapping other spans.
    pub windows: Vec<DiffWindow>,
    /// Number of rewrites performed in this run.
    pub replacements: usize,
}

/// Scans for value tokens and rewrites them in place.
#[derive(Debug, Clone)]
pub struct SubstitutionEngine {
    rate_token: String,
    role_token: String,
    currency: String,
    applied: Vec<Applied>,
    memo: Option<String>,
}

impl SubstitutionEngine {
    /// Creates an engine with the configured tokens.
    pub fn new(config: &SubstitutionConfig) -> Self {
        Self {
            rate_token: config.rate_token.clone(),
            role_token: config.role_token.clone(),
            currency: config.currency_symbol.clone(),
            applied: Vec::new(),
            memo: None,
        }
    }

    /// Runs one substitution pass.
    ///
    /// Returns `None` when the `(values, text)` pair matches the previous
    /// run, so callers can skip firing updates. Otherwise the outcome
    /// always carries the current span set, which is empty when nothing
    /// is applied, never stale.
    pub fn run(&mut self, text: &str, values: &SubstitutionValues) -> Option<SubstitutionOutcome> {
        let key = Self::memo_key(text, values);
        if self.memo.as_deref() == Some(key.as_str()) {
            return None;
        }

        let rate_value = values
            .rate
            .as_deref()
            .and_then(|raw| self.format_rate(raw));
        let role_value = values
            .role
            .clone()
            .filter(|role| !role.trim().is_empty());

        let mut out = text.to_string();
        let mut windows = Vec::new();
        let mut replacements = 0;

        for (kind, value) in [
            (TokenKind::Rate, rate_value.as_deref()),
            (TokenKind::Role, role_value.as_deref()),
        ] {
            replacements += self.rewrite_applied(&mut out, &mut windows, kind, value);
            if let Some(value) = value {
                replacements += self.substitute_tokens(&mut out, &mut windows, kind, value);
            }
        }

        self.memo = Some(Self::memo_key(&out, values));
        if replacements > 0 {
            debug!(target: "core.subst", replacements, "substitution_pass");
        }

        Some(SubstitutionOutcome {
            spans: merge_spans(self.applied.iter().map(|a| a.span).collect()),
            text: out,
            windows,
            replacements,
        })
    }

    /// Remaps the remembered substitution spans through a user edit.
    /// Spans consumed by the edit are forgotten.
    pub fn remap(&mut self, window: &DiffWindow) {
        self.applied
            .retain_mut(|applied| match window.map_span(applied.span) {
                Some(mapped) => {
                    applied.span = mapped;
                    true
                }
                None => false,
            });
    }

    /// Forgets everything. Called when the text is replaced wholesale
    /// (undo, redo, scenario load): remembered spans point into a text
    /// that no longer exists.
    pub fn reset(&mut self) {
        self.applied.clear();
        self.memo = None;
    }

    /// Rewrites previously applied spans whose value changed; drops the
    /// record of spans whose value became unavailable (the written text
    /// stays, the highlight does not).
    fn rewrite_applied(
        &mut self,
        text: &mut String,
        windows: &mut Vec<DiffWindow>,
        kind: TokenKind,
        value: Option<&str>,
    ) -> usize {
        let mut rewrites = 0;

        match value {
            None => {
                self.applied.retain(|a| a.kind != kind);
            }
            Some(value) => {
                let mut idx = 0;
                while idx < self.applied.len() {
                    if self.applied[idx].kind != kind || self.applied[idx].value == value {
                        idx += 1;
                        continue;
                    }

                    let span = self.applied[idx].span;
                    let window = splice(text, span, value);
                    windows.push(window);
                    self.remap_applied_except(idx, &window);
                    self.applied[idx].span = Span::new(span.start, span.start + value.chars().count());
                    self.applied[idx].value = value.to_string();
                    rewrites += 1;
                    idx += 1;
                }
            }
        }

        rewrites
    }

    /// Replaces every remaining occurrence of the token with the value,
    /// remembering each new span.
    fn substitute_tokens(
        &mut self,
        text: &mut String,
        windows: &mut Vec<DiffWindow>,
        kind: TokenKind,
        value: &str,
    ) -> usize {
        let token = match kind {
            TokenKind::Rate => self.rate_token.clone(),
            TokenKind::Role => self.role_token.clone(),
        };
        if token.is_empty() {
            return 0;
        }
        let token_len = token.chars().count();
        let value_len = value.chars().count();
        let mut substitutions = 0;

        // Each splice shifts everything after it, so the scan restarts
        // from just past the freshly written value.
        let mut from_char = 0;
        loop {
            let Some(found) = find_from(text, &token, from_char) else {
                break;
            };
            let span = Span::new(found, found + token_len);
            let window = splice(text, span, value);
            windows.push(window);
            self.remap_applied_except(usize::MAX, &window);
            self.applied.push(Applied {
                kind,
                span: Span::new(found, found + value_len),
                value: value.to_string(),
            });
            from_char = found + value_len;
            substitutions += 1;
        }

        substitutions
    }

    /// Remaps all remembered spans except the one being rewritten.
    fn remap_applied_except(&mut self, except: usize, window: &DiffWindow) {
        for (idx, applied) in self.applied.iter_mut().enumerate() {
            if idx == except {
                continue;
            }
            if let Some(mapped) = window.map_span(applied.span) {
                applied.span = mapped;
            }
        }
    }

    /// Formats a raw rate into a currency amount, e.g. `150` into
    /// `£150.00`. Non-numeric input means the value is unavailable.
    fn format_rate(&self, raw: &str) -> Option<String> {
        let amount: f64 = raw.trim().parse().ok()?;
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        Some(format!("{}{}", self.currency, format_amount(amount)))
    }

    fn memo_key(text: &str, values: &SubstitutionValues) -> String {
        format!(
            "{}|{}|{}",
            values.role.as_deref().unwrap_or(""),
            values.rate.as_deref().unwrap_or(""),
            text
        )
    }
}

/// Replaces a char-offset span of `text` with `value` in place, returning
/// the equivalent edit window.
fn splice(text: &mut String, span: Span, value: &str) -> DiffWindow {
    let byte_start = char_to_byte(text, span.start);
    let byte_end = char_to_byte(text, span.end);
    text.replace_range(byte_start..byte_end, value);
    DiffWindow::replacement(span, value.chars().count())
}

/// Finds the char offset of the next occurrence of `needle` at or after
/// `from_char`.
fn find_from(text: &str, needle: &str, from_char: usize) -> Option<usize> {
    let byte_from = char_to_byte(text, from_char);
    text[byte_from..]
        .find(needle)
        .map(|byte_offset| from_char + text[byte_from..byte_from + byte_offset].chars().count())
}

/// Formats an amount with thousands separators and two decimals.
fn format_amount(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{grouped}.{fraction:02}")
}
