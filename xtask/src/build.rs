use duct::cmd;

pub fn build_all_crates(
    release: bool,
    features: Option<Vec<String>>,
    no_default_features: bool,
) -> anyhow::Result<()> {
    let features = features.map(|x| x.join(","));
    let mut build_args = vec!["build", "--workspace", "--exclude", "bootnext-rs-fuzz"];

    if release {
        build_args.extend(["--profile", "release-lto"]);
    }

    if let Some(features) = &features {
        build_args.push("--features");
        build_args.push(features);
    }

    if no_default_features {
        build_args.push("--no-default-features");
    }

    cmd("cargo", build_args).run()?;
    Ok(())
}
