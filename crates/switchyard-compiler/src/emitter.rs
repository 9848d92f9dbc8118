/// Line-oriented source builder with four-space indentation.
#[derive(Debug, Default)]
pub(crate) struct Emitter {
  out: String,
  depth: usize,
}

impl Emitter {
  pub fn line(&mut self, text: impl AsRef<str>) {
    for _ in 0..self.depth {
      self.out.push_str("    ");
    }
    self.out.push_str(text.as_ref());
    self.out.push('\n');
  }

  pub fn blank(&mut self) {
    self.out.push('\n');
  }

  pub fn indent(&mut self) {
    self.depth += 1;
  }

  pub fn dedent(&mut self) {
    self.depth = self.depth.saturating_sub(1);
  }

  pub fn finish(self) -> String {
    self.out
  }
}

/// Render a string as a Rust string literal.
pub(crate) fn literal(value: &str) -> String {
  format!("{:?}", value)
}
