// ── Command-line tokenization ─────────────────────────────────────────────────
//
// CommandLineToArgvW wrappers.  The argv block the shell allocates is a
// single local-heap allocation owned by this module for the duration of the
// call and released through checked LocalFree — the release convention's
// canonical call site.

use windows_sys::Win32::System::Environment::GetCommandLineW;
use windows_sys::Win32::UI::Shell::CommandLineToArgvW;

use crate::check::check_handle;
use crate::error::Result;
use crate::heap::local_free;
use crate::wide::{from_wide_ptr, to_wide};

/// The process command line, tokenized with the shell's quoting rules.
pub fn args() -> Result<Vec<String>> {
    // SAFETY: GetCommandLineW returns a pointer into process memory that is
    // valid for the lifetime of the process; it is not freed here.
    let line = unsafe { GetCommandLineW() };
    let line = check_handle(line, "GetCommandLineW")?;

    // SAFETY: the process command line is null-terminated.
    unsafe { split(line) }
}

/// Tokenize an arbitrary command line with the shell's quoting rules.
///
/// An empty `line` follows the platform contract: the result is a single
/// token holding the current module's path.
pub fn parse(line: &str) -> Result<Vec<String>> {
    let line_w = to_wide(line);
    // SAFETY: line_w is valid null-terminated UTF-16 that outlives the call.
    unsafe { split(line_w.as_ptr()) }
}

/// Tokenize a null-terminated UTF-16 command line.
///
/// # Safety
///
/// `line` must be non-null and point to a null-terminated UTF-16 string that
/// stays valid for the duration of this call.
unsafe fn split(line: *const u16) -> Result<Vec<String>> {
    let mut count = 0i32;

    // SAFETY: line is valid per the caller's contract; count receives the
    // token count.
    let argv = unsafe { CommandLineToArgvW(line, &mut count) };
    let argv = check_handle(argv, "CommandLineToArgvW")?;

    let mut args = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        // SAFETY: argv holds `count` pointers, each to a null-terminated
        // string, all within the single block just returned.
        let arg = unsafe { *argv.add(i) };
        // SAFETY: same block; the strings outlive the argv allocation below.
        args.push(unsafe { from_wide_ptr(arg) });
    }

    // SAFETY: argv was returned by CommandLineToArgvW, is a local-heap
    // allocation owned by us, and is not used after this point.
    unsafe { local_free(argv.cast()) }?;

    Ok(args)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace() {
        let args = parse("tool.exe mount X: --readonly").expect("parse");
        assert_eq!(args, ["tool.exe", "mount", "X:", "--readonly"]);
    }

    #[test]
    fn quotes_group_embedded_spaces() {
        let args = parse(r#"tool.exe "C:\Program Files\thing" -f"#).expect("parse");
        assert_eq!(args, ["tool.exe", r"C:\Program Files\thing", "-f"]);
    }

    #[test]
    fn escaped_quote_is_literal() {
        let args = parse(r#"tool.exe \"quoted\""#).expect("parse");
        assert_eq!(args, ["tool.exe", r#""quoted""#]);
    }

    #[test]
    fn empty_line_yields_the_module_path() {
        let args = parse("").expect("parse");
        assert_eq!(args.len(), 1);
        assert!(!args[0].is_empty());
    }

    #[test]
    fn process_command_line_is_available() {
        let args = args().expect("args");
        assert!(!args.is_empty());
    }
}
