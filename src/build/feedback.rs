use colored::*;

/// Turns raw compiler/linker diagnostics into a short hint for the user.
pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    pub fn analyze(output: &str) -> Option<String> {
        if output.contains("undefined reference to `main'")
            || output.contains("entry point must be defined")
            || output.contains("_main\", referenced from")
        {
            return Some(format!(
                "No {} function among the linked units.\nCheck that the unit defining it is not marked {}.",
                "main()".bold().yellow(),
                "\"linkable\": false".bold().green()
            ));
        }

        if output.contains("LNK2019")
            || output.contains("undefined reference to")
            || output.contains("Undefined symbols")
        {
            return Some(format!(
                "It looks like a {} error.\nA library may be missing from {} in {}, or a unit was left out of the link.",
                "Linker".bold().red(),
                "\"libs\"".bold().yellow(),
                "build.json".bold().yellow()
            ));
        }

        if output.contains("fatal error: ") && output.contains("No such file or directory")
            || output.contains("cannot open include file")
        {
            return Some(format!(
                "It looks like a {} error.\nAdd the include path to {} (e.g. {}).",
                "Missing Header".bold().red(),
                "\"cflags\"".bold().yellow(),
                "-Iinclude".bold().green()
            ));
        }

        if output.contains("command not found") || output.contains("is not recognized as") {
            return Some(format!(
                "The {} or {} named in build.json is not on PATH.",
                "compiler".bold().yellow(),
                "linker".bold().yellow()
            ));
        }

        None
    }
}
