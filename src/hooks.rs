// Purpose: Go specific lifecycle hooks invoked by gx around import/install/init/update.
// Inputs/Outputs: Positional arguments from gx (hash, hash pair, or path); rewrites sources or prints.
// Invariants: Hooks never resolve or fetch packages themselves; descriptors must already be on disk.
// Gotchas: post-install searches the *parent* project's vendor tree when installed under vendor/gx/ipfs.

use anyhow::{Context, bail};
use std::ffi::OsStr;
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

use crate::pkg::importpath::import_identity;
use crate::pkg::loader::package_source_dir;
use crate::pkg::version::is_older;
use crate::pkg::{DepSearch, Dependency, Package, find_package_in_dir, load_dep};
use crate::rewrite::{
    ImportRewriter, apply_rewrite, build_rewrite_table, is_go_file, update_imports,
};
use crate::workspace::{PKG_FILE_NAME, Workspace};

fn absolute(ws: &Workspace, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        ws.cwd.join(p)
    }
}

/// Offer to switch imports of a freshly imported package's DVCS path to its vendored path.
pub fn hook_post_import(
    ws: &Workspace,
    dep_hash: &str,
    confirm: &mut dyn FnMut(&str) -> bool,
    rewriter: &dyn ImportRewriter,
) -> anyhow::Result<()> {
    Package::load(&ws.package_file())?;

    let dep = Dependency::new(dep_hash, dep_hash);
    let npkg = load_dep(&dep, &DepSearch::vendored(ws))?;
    let Some(dvcs) = npkg.dvcs_import() else {
        return Ok(());
    };

    let q = format!("update imports of {} to the newly imported package?", dvcs);
    if confirm(&q) {
        let nimp = npkg.gx_import(dep_hash);
        update_imports(&ws.cwd, dvcs, &nimp, rewriter)?;
    }
    Ok(())
}

// Precondition: `pkgpath` holds a package.json.
// Postcondition: Ok iff the package has no go version requirement or `have_version` satisfies it.
// Side effects: `have_version` typically shells out to `go version`.
pub fn hook_req_check(
    ws: &Workspace,
    pkgpath: &Path,
    have_version: &dyn Fn() -> crate::Result<String>,
) -> anyhow::Result<()> {
    let pkgfile = absolute(ws, pkgpath).join(PKG_FILE_NAME);
    let npkg = Package::load(&pkgfile)?;

    let Some(required) = npkg.go_version() else {
        return Ok(());
    };
    let have = have_version()?;
    if is_older(&have, required)? {
        return Err(crate::Error::UnsupportedVersion {
            package: npkg.name.clone(),
            required: required.to_string(),
            have,
        }
        .into());
    }
    debug!("go {} satisfies requirement {} of {}", have, required, npkg.name);
    Ok(())
}

pub fn hook_install_path(ws: &Workspace, global: bool, out: &mut dyn Write) -> anyhow::Result<()> {
    if global {
        let dir = ws.global_install_dir().context("GOPATH not set")?;
        writeln!(out, "{}", dir.display())?;
    } else {
        writeln!(out, "{}", ws.cwd.join("vendor").display())?;
    }
    Ok(())
}

/// Record the package's import identity as its DVCS import, when it sits under GOPATH/src.
pub fn hook_post_init(ws: &Workspace, dir: Option<&Path>) -> anyhow::Result<()> {
    let dir = dir.map(|d| absolute(ws, d)).unwrap_or_else(|| ws.cwd.clone());
    let pkgpath = dir.join(PKG_FILE_NAME);
    let mut pkg = Package::load(&pkgpath)?;

    let imp = ws
        .source_root()
        .and_then(|root| import_identity(&dir, root));
    match imp {
        Ok(imp) => pkg.gx.dvcsimport = Some(imp),
        Err(e) => debug!("not setting dvcsimport: {}", e),
    }

    pkg.save(&pkgpath)?;
    Ok(())
}

/// Rewrite a newly installed package's sources to use vendored imports, including its own.
pub fn hook_post_install(
    ws: &Workspace,
    npkg: &Path,
    rewriter: &dyn ImportRewriter,
) -> anyhow::Result<()> {
    let npkg = absolute(ws, npkg);
    let pkg = find_package_in_dir(&npkg).context("find package failed")?;
    let dir = package_source_dir(&npkg, &pkg);

    let reldir = vendor_root_of(&npkg).unwrap_or_else(|| dir.clone());
    let search = DepSearch::for_workspace(ws, reldir);
    let mut table =
        build_rewrite_table(&pkg, &search, false).context("building rewrite mapping failed")?;

    let Some(hash) = npkg.file_name().and_then(|s| s.to_str()) else {
        bail!("cannot determine package hash from {}", npkg.display());
    };
    if let Some(dvcs) = pkg.dvcs_import() {
        table.set(dvcs, pkg.gx_import(hash));
    }

    apply_rewrite(&mut table, &dir, &is_go_file, rewriter).context("rewrite failed")?;
    info!("rewrote imports of {} ({})", pkg.name, hash);
    Ok(())
}

pub fn hook_post_update(
    ws: &Workspace,
    old_hash: &str,
    new_hash: &str,
    rewriter: &dyn ImportRewriter,
) -> anyhow::Result<()> {
    let before = format!("gx/ipfs/{}", old_hash);
    let after = format!("gx/ipfs/{}", new_hash);
    update_imports(&ws.cwd, &before, &after, rewriter)?;
    Ok(())
}

/// `<project>/vendor/gx/ipfs` for a path somewhere beneath it.
fn vendor_root_of(p: &Path) -> Option<PathBuf> {
    let comps: Vec<Component<'_>> = p.components().collect();
    let marker = ["vendor", "gx", "ipfs"];
    let at = comps.windows(marker.len()).position(|w| {
        w.iter()
            .zip(marker)
            .all(|(c, m)| *c == Component::Normal(OsStr::new(m)))
    })?;
    Some(comps[..at + marker.len()].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::{
        hook_install_path, hook_post_import, hook_post_init, hook_post_install, hook_post_update,
        hook_req_check, vendor_root_of,
    };
    use crate::error::Error;
    use crate::pkg::Package;
    use crate::pkg::loader::tests::install;
    use crate::rewrite::GoSourceRewriter;
    use crate::workspace::Workspace;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn rw() -> GoSourceRewriter {
        GoSourceRewriter::new().expect("rewriter")
    }

    fn installed(version: &'static str) -> impl Fn() -> crate::Result<String> {
        move || Ok(version.to_string())
    }

    #[test]
    fn finds_vendor_root_of_installed_package() {
        assert_eq!(
            vendor_root_of(Path::new("/p/vendor/gx/ipfs/QmX")),
            Some(PathBuf::from("/p/vendor/gx/ipfs"))
        );
        assert_eq!(vendor_root_of(Path::new("/gp/src/gx/ipfs/QmX")), None);
    }

    #[test]
    fn post_install_rewrites_package_and_its_deps() {
        let dir = tempfile::tempdir().expect("tempdir");
        let vendor = dir.path().join("vendor").join("gx").join("ipfs");
        install(&vendor, "QmDep", "dep", Some("github.com/o/dep"), &[]);
        install(&vendor, "QmNew", "lib", Some("github.com/o/lib"), &[("dep", "QmDep")]);
        let src = vendor.join("QmNew").join("lib").join("lib.go");
        fs::write(
            &src,
            "package lib\n\nimport (\n\t\"github.com/o/dep/util\"\n\t\"github.com/o/lib/internal\"\n)\n",
        )
        .expect("write lib.go");

        let ws = Workspace::new(dir.path().to_path_buf(), None);
        hook_post_install(&ws, &vendor.join("QmNew"), &rw()).expect("post-install");

        let text = fs::read_to_string(&src).expect("read");
        assert!(text.contains("\"gx/ipfs/QmDep/dep/util\""), "{text}");
        assert!(text.contains("\"gx/ipfs/QmNew/lib/internal\""), "{text}");
    }

    #[test]
    fn post_update_swaps_hashes_outside_vendor() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("vendor")).expect("mkdir vendor");
        let body = "package a\n\nimport \"gx/ipfs/QmOld/log/writer\"\n";
        fs::write(root.join("a.go"), body).expect("write a.go");
        fs::write(root.join("vendor").join("v.go"), body).expect("write v.go");

        let ws = Workspace::new(root.to_path_buf(), None);
        hook_post_update(&ws, "QmOld", "QmNew", &rw()).expect("post-update");
        assert_eq!(
            fs::read_to_string(root.join("a.go")).expect("read"),
            "package a\n\nimport \"gx/ipfs/QmNew/log/writer\"\n"
        );
        assert_eq!(fs::read_to_string(root.join("vendor").join("v.go")).expect("read"), body);
    }

    #[test]
    fn post_import_only_rewrites_when_confirmed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::write(root.join("package.json"), r#"{"name":"app"}"#).expect("write package");
        install(
            &root.join("vendor").join("gx").join("ipfs"),
            "QmLog",
            "go-log",
            Some("github.com/ipfs/go-log"),
            &[],
        );
        let body = "package a\n\nimport \"github.com/ipfs/go-log\"\n";
        fs::write(root.join("a.go"), body).expect("write a.go");
        let ws = Workspace::new(root.to_path_buf(), None);

        let mut asked = Vec::new();
        let mut decline = |q: &str| {
            asked.push(q.to_string());
            false
        };
        hook_post_import(&ws, "QmLog", &mut decline, &rw()).expect("declined");
        assert_eq!(fs::read_to_string(root.join("a.go")).expect("read"), body);
        assert_eq!(
            asked,
            vec!["update imports of github.com/ipfs/go-log to the newly imported package?"]
        );

        hook_post_import(&ws, "QmLog", &mut |_: &str| true, &rw()).expect("accepted");
        assert_eq!(
            fs::read_to_string(root.join("a.go")).expect("read"),
            "package a\n\nimport \"gx/ipfs/QmLog/go-log\"\n"
        );
    }

    #[test]
    fn req_check_compares_against_installed_compiler() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(
            dir.path().join("package.json"),
            r#"{"name":"needs-new-go","gx":{"goversion":"1.9"}}"#,
        )
        .expect("write package");
        let ws = Workspace::new(dir.path().to_path_buf(), None);

        hook_req_check(&ws, dir.path(), &installed("1.10.3")).expect("new enough");
        let err = hook_req_check(&ws, dir.path(), &installed("1.8")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::UnsupportedVersion { required, have, .. }) if required == "1.9" && have == "1.8"
        ));
    }

    #[test]
    fn req_check_without_requirement_never_probes() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("package.json"), r#"{"name":"any-go"}"#).expect("write");
        let ws = Workspace::new(dir.path().to_path_buf(), None);
        let probe = || -> crate::Result<String> { panic!("must not probe") };
        hook_req_check(&ws, Path::new("."), &probe).expect("no requirement");
    }

    #[test]
    fn post_init_sets_dvcs_import_under_gopath() {
        let gopath = tempfile::tempdir().expect("gopath");
        let pkg_dir = gopath.path().join("src").join("github.com").join("me").join("app");
        fs::create_dir_all(&pkg_dir).expect("mkdir");
        fs::write(pkg_dir.join("package.json"), r#"{"name":"app","license":"MIT"}"#).expect("write");

        let ws = Workspace::new(PathBuf::from("/unused"), Some(gopath.path().to_path_buf()));
        hook_post_init(&ws, Some(&pkg_dir)).expect("post-init");

        let pkg = Package::load(&pkg_dir.join("package.json")).expect("reload");
        assert_eq!(pkg.dvcs_import(), Some("github.com/me/app"));
        assert_eq!(pkg.extra["license"], "MIT");
    }

    #[test]
    fn install_path_local_and_global() {
        let ws = Workspace::new(PathBuf::from("/w/app"), Some(PathBuf::from("/gp")));
        let mut out: Vec<u8> = Vec::new();
        hook_install_path(&ws, false, &mut out).expect("local");
        hook_install_path(&ws, true, &mut out).expect("global");
        assert_eq!(String::from_utf8(out).expect("utf8"), "/w/app/vendor\n/gp/src\n");

        let no_gopath = Workspace::new(PathBuf::from("/w/app"), None);
        assert!(hook_install_path(&no_gopath, true, &mut Vec::<u8>::new()).is_err());
    }
}
