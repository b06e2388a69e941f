use kernelc::dialect::{create_dialect, BUILTIN_DIALECTS};

pub fn cmd_targets() {
    for name in BUILTIN_DIALECTS {
        if let Some(d) = create_dialect(name) {
            let style = d.style();
            let braces = if style.brace_on_new_line { "allman" } else { "k&r" };
            println!(
                "{:<8} {:<7} indent {:?}, {}",
                d.name(),
                d.file_extension(),
                style.indent,
                braces
            );
        }
    }
}
