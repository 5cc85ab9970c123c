use duct::cmd;

pub fn test_on_host(features: bool) -> anyhow::Result<()> {
    cmd!("cargo", "clippy", "--workspace", "--exclude", "bootnext-rs-fuzz").run()?;
    cmd!("cargo", "test", "--workspace", "--exclude", "bootnext-rs-fuzz").run()?;

    if features {
        for only in ["linux", "windows"] {
            cmd!(
                "cargo",
                "check",
                "-p",
                "bootnext-rs-core",
                "--no-default-features",
                "--features",
                only
            )
            .run()?;
        }
        cmd!("cargo", "check", "-p", "bootnext-rs-core", "--no-default-features").run()?;
    }
    Ok(())
}
