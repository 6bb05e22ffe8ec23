use deltatask::cli::{exit_code, run, EXIT_INTERNAL_ERROR};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("DELTATASK_LOG", "warn"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run() {
        let code = exit_code(&e);
        if code == EXIT_INTERNAL_ERROR {
            eprintln!("Internal error: {}", e);
            // Show error chain if available
            let mut causes = e.chain().skip(1).peekable();
            if causes.peek().is_some() {
                eprintln!("\nCaused by:");
                for (indent, cause) in causes.enumerate() {
                    eprintln!("{:indent$}  {}", "", cause, indent = indent + 1);
                }
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(code);
    }
}
