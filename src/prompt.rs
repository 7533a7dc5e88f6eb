use std::io::{self, BufRead, IsTerminal, Write};

pub struct ShellPrompt {
    prompt: String,
    interactive: bool,
}

impl ShellPrompt {
    /// The prompt is only shown when stdin is a terminal.
    pub fn new(prompt: impl Into<String>) -> Self {
        ShellPrompt {
            prompt: prompt.into(),
            interactive: io::stdin().is_terminal(),
        }
    }

    pub fn show_prompt(&self) -> io::Result<()> {
        if self.interactive {
            let mut out = io::stdout();
            out.write_all(self.prompt.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }

    pub fn read_line(&self) -> io::Result<Option<String>> {
        let stdin = io::stdin();
        let line = self.read_line_from(&mut stdin.lock())?;
        if line.is_none() && self.interactive {
            // EOF (e.g., Ctrl-D)
            println!();
        }
        Ok(line)
    }

    /// Reads one line with its line terminator stripped; `None` at EOF.
    pub fn read_line_from<R: BufRead>(&self, reader: &mut R) -> io::Result<Option<String>> {
        let mut buf = String::new();
        let bytes_read = reader.read_line(&mut buf)?;
        if bytes_read == 0 {
            return Ok(None);
        }
        let line = buf.strip_suffix('\n').unwrap_or(&buf);
        let line = line.strip_suffix('\r').unwrap_or(line);
        Ok(Some(line.to_string()))
    }
}
