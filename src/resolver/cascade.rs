//! Rule cascade
//!
//! Walks the segment list left to right. On every iteration the rules in
//! [`Rule::ORDER`] are tried in turn and the first one that applies either
//! advances the walk or finishes it. When none applies the path does not
//! resolve.
//!
//! ```text
//! /dir1/key1/dir2/file   parent=dir1  head=key1  rest=[dir2, file]
//!   BindBeforeDirectory  -> params=[(dir1, key1)]  head=dir2
//!   Descend              -> working=[dir1, dir2]   head=file
//!   TerminalFile         -> found dir1/dir2/file
//! ```

use super::outcome::{Found, Param, Redirect, Resolution};
use super::probe::Probe;
use super::ResolveOptions;
use crate::error::ResolveError;
use crate::fs::FileSystem;
use crate::logger;
use std::collections::VecDeque;
use std::mem;

/// One row of the decision table, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// `head` is a directory: descend into it
    Descend,
    /// `head` is a value for `parent` because the next segment is a directory
    BindBeforeDirectory,
    /// `head` is a value for `parent` because the next segment is a file
    BindBeforeFile,
    /// `head` is the last segment and a file
    TerminalFile,
    /// `head` is a file followed by exactly one value
    FileWithParam,
    /// `head` is the last segment and a value for the default page
    ImplicitIndex,
    /// `head` is a value for `parent`, the last segment one for the default page
    AnchoredIndex,
}

impl Rule {
    pub const ORDER: [Self; 7] = [
        Self::Descend,
        Self::BindBeforeDirectory,
        Self::BindBeforeFile,
        Self::TerminalFile,
        Self::FileWithParam,
        Self::ImplicitIndex,
        Self::AnchoredIndex,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Descend => "descend",
            Self::BindBeforeDirectory => "bind_before_directory",
            Self::BindBeforeFile => "bind_before_file",
            Self::TerminalFile => "terminal_file",
            Self::FileWithParam => "file_with_param",
            Self::ImplicitIndex => "implicit_index",
            Self::AnchoredIndex => "anchored_index",
        }
    }
}

enum Step {
    Continue,
    Finish(Resolution),
}

/// State of one resolution
pub struct Walk<'a, F: ?Sized> {
    probe: Probe<'a, F>,
    options: &'a ResolveOptions,
    /// The full request path, used to build redirect locations
    segments: &'a [String],
    head: String,
    rest: VecDeque<String>,
    working: Vec<String>,
    parent: Option<String>,
    params: Vec<Param>,
    fired: Vec<Rule>,
}

impl<'a, F: FileSystem + ?Sized> Walk<'a, F> {
    pub fn new(probe: Probe<'a, F>, options: &'a ResolveOptions, segments: &'a [String]) -> Self {
        let mut rest: VecDeque<String> = segments.iter().cloned().collect();
        let head = rest.pop_front().unwrap_or_default();
        Self {
            probe,
            options,
            segments,
            head,
            rest,
            working: Vec::new(),
            parent: None,
            params: Vec::new(),
            fired: Vec::new(),
        }
    }

    pub fn run(self) -> Result<Resolution, ResolveError> {
        self.run_traced().map(|(resolution, _)| resolution)
    }

    /// Run the walk and also return the rules that fired, in order
    pub fn run_traced(mut self) -> Result<(Resolution, Vec<Rule>), ResolveError> {
        'walk: loop {
            for rule in Rule::ORDER {
                let Some(step) = self.apply(rule)? else {
                    continue;
                };
                self.fired.push(rule);
                logger::log_rule_fired(rule.name(), &self.working);
                match step {
                    Step::Continue => continue 'walk,
                    Step::Finish(resolution) => return Ok((resolution, self.fired)),
                }
            }
            return Ok((Resolution::NotFound, self.fired));
        }
    }

    fn apply(&mut self, rule: Rule) -> Result<Option<Step>, ResolveError> {
        match rule {
            Rule::Descend => self.descend(),
            Rule::BindBeforeDirectory => self.bind_before_directory(),
            Rule::BindBeforeFile => self.bind_before_file(),
            Rule::TerminalFile => self.terminal_file(),
            Rule::FileWithParam => self.file_with_param(),
            Rule::ImplicitIndex => self.implicit_index(),
            Rule::AnchoredIndex => self.anchored_index(),
        }
    }

    fn descend(&mut self) -> Result<Option<Step>, ResolveError> {
        if !self.probe.is_dir(&self.working, &self.head)? {
            return Ok(None);
        }

        let dir = mem::take(&mut self.head);
        self.working.push(dir.clone());
        self.parent = Some(dir);

        Ok(Some(match self.rest.pop_front() {
            Some(next) => {
                self.head = next;
                Step::Continue
            }
            // Directories are canonically addressed with a trailing slash
            None => Step::Finish(Resolution::Redirect(Redirect::new(format!(
                "/{}/",
                self.segments.join("/")
            )))),
        }))
    }

    fn bind_before_directory(&mut self) -> Result<Option<Step>, ResolveError> {
        if self.parent.is_none() {
            return Ok(None);
        }
        let Some(next) = self.rest.front() else {
            return Ok(None);
        };
        if !self.probe.is_dir(&self.working, next)? {
            return Ok(None);
        }
        Ok(Some(self.bind_head_to_parent()))
    }

    fn bind_before_file(&mut self) -> Result<Option<Step>, ResolveError> {
        if self.parent.is_none() || self.rest.len() > 2 {
            return Ok(None);
        }
        // Only the nearest remaining segment is looked at
        let Some(next) = self.rest.front() else {
            return Ok(None);
        };
        if self.probe.find_file(&self.working, next)?.is_none() {
            return Ok(None);
        }
        Ok(Some(self.bind_head_to_parent()))
    }

    fn terminal_file(&mut self) -> Result<Option<Step>, ResolveError> {
        if !self.rest.is_empty() {
            return Ok(None);
        }
        let Some(matched) = self.probe.find_file(&self.working, &self.head)? else {
            return Ok(None);
        };

        if self.squashes_head() {
            // /dir1/dir2/index -> /dir1/dir2/
            let mut location = self.location_parts();
            if let Some(last) = location.last_mut() {
                *last = "";
            }
            return Ok(Some(redirect_to(&location)));
        }

        Ok(Some(self.finish(Found::new(matched, Vec::new()))))
    }

    fn file_with_param(&mut self) -> Result<Option<Step>, ResolveError> {
        if self.rest.len() != 1 {
            return Ok(None);
        }
        let Some(matched) = self.probe.find_file(&self.working, &self.head)? else {
            return Ok(None);
        };

        if self.squashes_head() {
            // /dir1/index/arg1 -> /dir1/arg1
            let mut location = self.location_parts();
            let head_at = location.len() - 2;
            location.remove(head_at);
            return Ok(Some(redirect_to(&location)));
        }

        let value = self.rest.pop_front().unwrap_or_default();
        self.params.push(Param::new(matched.file(), value));
        Ok(Some(self.finish(Found::new(matched, Vec::new()))))
    }

    fn implicit_index(&mut self) -> Result<Option<Step>, ResolveError> {
        if !self.rest.is_empty() {
            return Ok(None);
        }
        let Some(matched) = self.probe.find_default_page(&self.working)? else {
            return Ok(None);
        };

        let name = self
            .parent
            .take()
            .unwrap_or_else(|| matched.file().to_string());
        let value = mem::take(&mut self.head);
        self.params.push(Param::new(name, value));
        Ok(Some(self.finish(Found::new(matched, Vec::new()))))
    }

    fn anchored_index(&mut self) -> Result<Option<Step>, ResolveError> {
        if self.parent.is_none() || self.rest.len() != 1 {
            return Ok(None);
        }
        let Some(matched) = self.probe.find_default_page(&self.working)? else {
            return Ok(None);
        };

        let parent = self.parent.take().unwrap_or_default();
        let head = mem::take(&mut self.head);
        let last = self.rest.pop_front().unwrap_or_default();
        self.params.push(Param::new(parent, head));
        self.params.push(Param::new(matched.file(), last));
        Ok(Some(self.finish(Found::new(matched, Vec::new()))))
    }

    /// Bind `head` as the value of `parent` and move to the next segment
    fn bind_head_to_parent(&mut self) -> Step {
        if let Some(parent) = self.parent.take() {
            let value = mem::take(&mut self.head);
            self.params.push(Param::new(parent, value));
        }
        self.head = self.rest.pop_front().unwrap_or_default();
        Step::Continue
    }

    fn squashes_head(&self) -> bool {
        self.options.squash_default_page && self.options.is_default_page(&self.head)
    }

    /// Request path as `["", seg1, seg2, ...]`, ready to join with `/`
    fn location_parts(&self) -> Vec<&'a str> {
        std::iter::once("")
            .chain(self.segments.iter().map(String::as_str))
            .collect()
    }

    fn finish(&mut self, mut found: Found) -> Step {
        found.params = mem::take(&mut self.params);
        Step::Finish(Resolution::Found(found))
    }
}

fn redirect_to(parts: &[&str]) -> Step {
    Step::Finish(Resolution::Redirect(Redirect::new(parts.join("/"))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemoryFs;
    use std::path::Path;

    const BASE: &str = "webroot";

    fn webroot() -> MemoryFs {
        MemoryFs::from_files([
            "webroot/index.js",
            "webroot/dir1/dir2/index.js",
            "webroot/dir1/dir2/file3.js",
            "webroot/dir1/file4.js",
            "webroot/dir1/file4.hbs",
            "webroot/plain/page.js",
        ])
    }

    fn js_hbs() -> ResolveOptions {
        ResolveOptions::new(["js", "hbs"])
    }

    fn run(fs: &MemoryFs, options: &ResolveOptions, url: &str) -> (Resolution, Vec<Rule>) {
        let segments = super::super::tokenize(url);
        let probe = Probe::new(fs, Path::new(BASE), options);
        Walk::new(probe, options, &segments).run_traced().unwrap()
    }

    #[derive(Debug)]
    enum Expect {
        Redirect(&'static str),
        Found(&'static str, &'static [(&'static str, &'static str)]),
        NotFound,
    }

    fn check(resolution: &Resolution, expect: &Expect, url: &str) {
        match (resolution, expect) {
            (Resolution::Redirect(r), Expect::Redirect(location)) => {
                assert_eq!(r.location, *location, "{url}");
            }
            (Resolution::Found(f), Expect::Found(filename, params)) => {
                let target = Path::new(&f.file_path).with_file_name(&f.filename);
                assert_eq!(target, Path::new(filename), "{url}");
                let expected: Vec<Param> = params.iter().map(|&p| Param::from(p)).collect();
                assert_eq!(f.params, expected, "{url}");
            }
            (Resolution::NotFound, Expect::NotFound) => {}
            (got, want) => panic!("{url}: expected {want:?}, got {got:?}"),
        }
    }

    #[test]
    fn test_request_scenarios() {
        use Expect::{Found, NotFound, Redirect};

        let scenarios: &[(&str, Expect)] = &[
            ("/dir1/dir2", Redirect("/dir1/dir2/")),
            ("/dir1/dir2/index", Redirect("/dir1/dir2/")),
            ("/index", Redirect("/")),
            ("no-match", Found("index.js", &[("index", "no-match")])),
            ("/no-match", Found("index.js", &[("index", "no-match")])),
            ("", Found("index.js", &[])),
            ("/", Found("index.js", &[])),
            ("/dir1/dir2/", Found("dir1/dir2/index.js", &[])),
            ("/dir1/dir2/file3", Found("dir1/dir2/file3.js", &[])),
            ("/dir1/dir2/file3/arg1", Found("dir1/dir2/file3.js", &[("file3", "arg1")])),
            ("/arg1", Found("index.js", &[("index", "arg1")])),
            ("/dir1/dir2/arg1", Found("dir1/dir2/index.js", &[("dir2", "arg1")])),
            ("/dir1/file4", Found("dir1/file4.js", &[])),
            (
                "/dir1/arg1/dir2/arg2/file3/arg3",
                Found(
                    "dir1/dir2/file3.js",
                    &[("dir1", "arg1"), ("dir2", "arg2"), ("file3", "arg3")],
                ),
            ),
            (
                "/dir1/arg1/dir2/arg2/index/arg3",
                Redirect("/dir1/arg1/dir2/arg2/arg3"),
            ),
            (
                "/dir1/arg1/dir2/arg2/arg3",
                Found(
                    "dir1/dir2/index.js",
                    &[("dir1", "arg1"), ("dir2", "arg2"), ("index", "arg3")],
                ),
            ),
            (
                "/dir1/arg1/dir2/arg2",
                Found("dir1/dir2/index.js", &[("dir1", "arg1"), ("dir2", "arg2")]),
            ),
            ("/arg1/arg2", NotFound),
            ("/plain/page", Found("plain/page.js", &[])),
            ("/plain/x", NotFound),
        ];

        let fs = webroot();
        let options = js_hbs();
        for (url, expect) in scenarios {
            let (resolution, _) = run(&fs, &options, url);
            check(&resolution, expect, url);
        }
    }

    #[test]
    fn test_rule_order_table() {
        use Rule::{
            AnchoredIndex, BindBeforeDirectory, BindBeforeFile, Descend, FileWithParam,
            ImplicitIndex, TerminalFile,
        };

        // (path, rules fired, outcome label)
        let table: &[(&str, &[Rule], &str)] = &[
            // directory, nothing after
            ("/dir1/dir2", &[Descend, Descend], "redirect"),
            // parent set, directory ahead
            (
                "/dir1/arg1/dir2/",
                &[Descend, BindBeforeDirectory, Descend, TerminalFile],
                "found",
            ),
            // parent set, file ahead, one remaining
            ("/dir1/arg1/file4", &[Descend, BindBeforeFile, TerminalFile], "found"),
            // parent set, file ahead, two remaining
            (
                "/dir1/arg1/file4/x",
                &[Descend, BindBeforeFile, FileWithParam],
                "found",
            ),
            // parent set, two remaining, only the farther one a file:
            // just the nearest segment is looked at
            ("/dir1/arg1/x/file4", &[Descend], "not_found"),
            // parent set, three remaining: look-ahead does not apply
            ("/dir1/arg1/a/b/file4", &[Descend], "not_found"),
            // file, zero trailing
            ("/dir1/dir2/file3", &[Descend, Descend, TerminalFile], "found"),
            // file, one trailing
            ("/dir1/dir2/file3/x", &[Descend, Descend, FileWithParam], "found"),
            // file, two trailing
            ("/dir1/dir2/file3/x/y", &[Descend, Descend], "not_found"),
            // neither, zero trailing, parent set
            ("/dir1/dir2/x", &[Descend, Descend, ImplicitIndex], "found"),
            // neither, zero trailing, parent unset
            ("/x", &[ImplicitIndex], "found"),
            // neither, one trailing, parent set
            (
                "/dir1/arg1/dir2/arg2/arg3",
                &[Descend, BindBeforeDirectory, Descend, AnchoredIndex],
                "found",
            ),
            // neither, one trailing, parent unset
            ("/x/y", &[], "not_found"),
            // neither, directory without a default page
            ("/plain/x", &[Descend], "not_found"),
            ("/plain/x/y", &[Descend], "not_found"),
            // a file ahead wins over the current segment being a file
            ("/dir1/file4/file4", &[Descend, BindBeforeFile, TerminalFile], "found"),
            ("/dir1/file4/x", &[Descend, FileWithParam], "found"),
        ];

        let fs = webroot();
        let options = js_hbs();
        for (url, rules, label) in table {
            let (resolution, fired) = run(&fs, &options, url);
            assert_eq!(&fired, rules, "{url}");
            assert_eq!(resolution.label(), *label, "{url}");
        }
    }

    #[test]
    fn test_file_ahead_binds_to_parent() {
        let (resolution, _) = run(&webroot(), &js_hbs(), "/dir1/file4/file4");
        let found = resolution.found().unwrap();
        assert_eq!(found.file, "file4");
        assert_eq!(found.params, vec![Param::new("dir1", "file4")]);
    }

    #[test]
    fn test_directory_beats_file_of_same_name() {
        let fs = MemoryFs::from_files([
            "webroot/dir1/dir2/index.js",
            "webroot/dir1/dir2.js",
            "webroot/dir1/index.js",
        ]);
        let options = js_hbs();

        let (resolution, _) = run(&fs, &options, "/dir1/dir2");
        assert_eq!(resolution.redirect().unwrap().location, "/dir1/dir2/");

        let (resolution, fired) = run(&fs, &options, "/dir1/arg1/dir2");
        assert_eq!(
            fired,
            vec![Rule::Descend, Rule::BindBeforeDirectory, Rule::Descend]
        );
        assert_eq!(resolution.redirect().unwrap().location, "/dir1/arg1/dir2/");
    }

    #[test]
    fn test_squash_disabled() {
        let fs = webroot();
        let options = js_hbs().with_squash(false);

        let (resolution, _) = run(&fs, &options, "/dir1/dir2/index");
        check(&resolution, &Expect::Found("dir1/dir2/index.js", &[]), "index");

        let (resolution, _) = run(&fs, &options, "/index/arg1");
        check(
            &resolution,
            &Expect::Found("index.js", &[("index", "arg1")]),
            "index/arg1",
        );
    }

    #[test]
    fn test_index_with_param_redirects() {
        let (resolution, _) = run(&webroot(), &js_hbs(), "/index/arg1");
        assert_eq!(resolution.redirect().unwrap().location, "/arg1");
    }

    #[test]
    fn test_redirect_targets_are_canonical() {
        let fs = webroot();
        let options = js_hbs();
        let paths = [
            "/dir1/dir2",
            "/dir1/dir2/index",
            "/index",
            "/index/arg1",
            "/dir1/arg1/dir2",
            "/dir1/arg1/dir2/arg2/index/arg3",
            "/dir1",
        ];
        for url in paths {
            let (resolution, _) = run(&fs, &options, url);
            let location = &resolution.redirect().unwrap().location;
            let (again, _) = run(&fs, &options, location);
            assert!(!again.is_redirect(), "{url} -> {location} -> {again:?}");
        }
    }

    #[test]
    fn test_extension_preference() {
        let fs = webroot();

        let (resolution, _) = run(&fs, &js_hbs(), "/dir1/file4");
        let found = resolution.found().unwrap();
        assert_eq!(found.extensions, vec!["js", "hbs"]);
        assert_eq!(found.filename, "file4.js");

        let (resolution, _) = run(&fs, &ResolveOptions::new(["hbs", "js"]), "/dir1/file4");
        assert_eq!(resolution.found().unwrap().filename, "file4.hbs");
    }

    #[test]
    fn test_empty_extension_list_matches_nothing() {
        let options = ResolveOptions::new(Vec::<String>::new());
        let (resolution, _) = run(&webroot(), &options, "/");
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[test]
    fn test_custom_default_page() {
        let fs = MemoryFs::from_files(["webroot/home.js", "webroot/docs/home.js"]);
        let options = ResolveOptions::new(["js"]).with_default_pages(["home"]);

        let (resolution, _) = run(&fs, &options, "/");
        assert_eq!(resolution.found().unwrap().filename, "home.js");

        let (resolution, _) = run(&fs, &options, "/docs/home");
        assert_eq!(resolution.redirect().unwrap().location, "/docs/");

        let (resolution, _) = run(&fs, &options, "/x");
        check(&resolution, &Expect::Found("home.js", &[("home", "x")]), "/x");

        let (resolution, _) = run(&fs, &options, "/index");
        check(&resolution, &Expect::Found("home.js", &[("home", "index")]), "/index");
    }

    #[test]
    fn test_presplit_segments() {
        let fs = webroot();
        let options = js_hbs();
        let probe = Probe::new(&fs, Path::new(BASE), &options);
        let segments: Vec<String> = vec!["dir1".into(), "dir2".into(), "file3".into()];

        let resolution = Walk::new(probe, &options, &segments).run().unwrap();
        assert_eq!(resolution.found().unwrap().file, "file3");
    }

    #[test]
    fn test_empty_segment_list_is_root() {
        let fs = webroot();
        let options = js_hbs();
        let probe = Probe::new(&fs, Path::new(BASE), &options);

        let resolution = Walk::new(probe, &options, &[]).run().unwrap();
        assert_eq!(resolution.found().unwrap().filename, "index.js");
    }

    #[test]
    fn test_traversal_segments_never_resolve() {
        let fs = webroot().with_file("secret.js");
        let options = js_hbs();
        let probe = Probe::new(&fs, Path::new(BASE), &options);
        let segments: Vec<String> = vec!["..".into(), "secret".into()];

        let resolution = Walk::new(probe, &options, &segments).run().unwrap();
        assert_eq!(resolution, Resolution::NotFound);
    }

    #[test]
    fn test_filesystem_error_is_not_not_found() {
        let fs = webroot().with_failure("webroot/dir1/dir2");
        let options = js_hbs();
        let segments = super::super::tokenize("/dir1/dir2/file3");
        let probe = Probe::new(&fs, Path::new(BASE), &options);

        let err = Walk::new(probe, &options, &segments).run().unwrap_err();
        assert_eq!(err.path(), Path::new("webroot/dir1/dir2"));
    }

    #[test]
    fn test_rule_names() {
        let names: Vec<&str> = Rule::ORDER.iter().map(|r| r.name()).collect();
        assert_eq!(names[0], "descend");
        assert_eq!(names[6], "anchored_index");
    }
}
