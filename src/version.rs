/// `"<name> <version>"` followed by `extra` on its own line.
pub fn version_info(extra: &str) -> String {
    [
        format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        extra.to_string(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_info_has_two_lines() {
        let info = version_info("build: local");
        let lines: Vec<&str> = info.lines().collect();
        assert_eq!(lines, vec![concat!("livevars ", env!("CARGO_PKG_VERSION")), "build: local"]);
    }
}
