use super::*;
use crate::error::BuildError;
use std::fs;
use tempfile::TempDir;

fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn setup_project(root: &Path) {
    write_file(
        root,
        CONFIG_FILE,
        "name: Test Site\nbase_url: https://example.com/\ndescription: A test site\n",
    );
    write_file(
        root,
        "content/blog/hello.md",
        "---\ntitle: Hello\ndate: 2024-03-01\ntags: [Rust, Intro]\n---\nHello *world*.\n",
    );
    write_file(
        root,
        "content/blog/second.md",
        "---\ntitle: Second Post\ndate: 2024-04-01\ntags: [rust]\n---\nMore words here.\n",
    );
    write_file(
        root,
        "content/about.md",
        "---\ntitle: About\nweight: 1\n---\nAbout this site.\n",
    );
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative))
        .unwrap_or_else(|err| panic!("failed to read {relative}: {err}"))
}

fn build(root: &Path) -> Result<BuildReport> {
    build_site(root, &BuildOptions::default())
}

fn staging_leftovers(root: &Path) -> Vec<String> {
    fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(STAGING_PREFIX))
        .collect()
}

#[test]
fn builds_pages_indexes_and_machine_outputs() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);

    let report = build(root).unwrap();

    assert_eq!(report.pages, 3);
    assert_eq!(report.sections, 1);
    assert_eq!(report.tags, 2);
    assert_eq!(report.search_entries, Some(3));
    assert_eq!(report.output, root.join("public"));

    let hello = read(root, "public/blog/hello/index.html");
    assert!(hello.contains("<title>Hello - Test Site</title>"));
    assert!(hello.contains("<h1>Hello</h1>"));
    assert!(hello.contains("<em>world</em>"));
    assert!(hello.contains(r#"<time datetime="2024-03-01T00:00:00Z">2024-03-01</time>"#));
    // minijinja escapes `/` inside attribute values.
    assert!(hello.contains(r#"<a href="&#x2f;tags&#x2f;rust&#x2f;">rust</a>"#));

    let about = read(root, "public/about/index.html");
    assert!(about.contains("<h1>About</h1>"));

    let blog = read(root, "public/blog/index.html");
    assert!(blog.contains("<h1>Blog</h1>"));
    let second = blog.find(">Second Post</a>").unwrap();
    let first = blog.find(">Hello</a>").unwrap();
    assert!(second < first, "newest post should be listed first");

    let tag = read(root, "public/tags/rust/index.html");
    assert!(tag.contains(">Hello</a>"));
    assert!(tag.contains(">Second Post</a>"));
    assert!(root.join("public/tags/intro/index.html").exists());

    let home = read(root, "public/index.html");
    assert!(home.contains("Test Site"));

    let feed = read(root, "public/feed.xml");
    assert!(feed.contains("<link>https://example.com/blog/hello/</link>"));
    assert!(feed.contains("<pubDate>Fri, 01 Mar 2024 00:00:00 +0000</pubDate>"));

    let sitemap = read(root, "public/sitemap.xml");
    assert!(sitemap.contains("<loc>https://example.com/</loc>"));
    assert!(sitemap.contains("<loc>https://example.com/blog/</loc>"));
    assert!(sitemap.contains("<loc>https://example.com/tags/rust/</loc>"));
    assert!(sitemap.contains("<loc>https://example.com/about/</loc>"));
    assert!(sitemap.contains("<lastmod>2024-04-01T00:00:00Z</lastmod>"));

    let robots = read(root, "public/robots.txt");
    assert!(robots.contains("Sitemap: https://example.com/sitemap.xml"));

    let entries = search::load_index(&root.join("public/search.json")).unwrap();
    let urls: Vec<&str> = entries.iter().map(|entry| entry.url.as_str()).collect();
    assert_eq!(urls, vec!["/blog/second/", "/blog/hello/", "/about/"]);
    assert_eq!(entries[1].summary, "Hello world.");
    assert_eq!(entries[1].section, "blog");
    assert_eq!(entries[1].tags, vec!["rust", "intro"]);

    assert!(staging_leftovers(root).is_empty());
}

#[test]
fn drafts_are_skipped_unless_requested() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        "content/blog/wip.md",
        "---\ntitle: Work in progress\ndraft: true\n---\nNot yet.\n",
    );

    let report = build(root).unwrap();
    assert_eq!(report.drafts_skipped, 1);
    assert!(!root.join("public/blog/wip/index.html").exists());

    let options = BuildOptions {
        include_drafts: true,
        ..BuildOptions::default()
    };
    let report = build_site(root, &options).unwrap();
    assert_eq!(report.drafts_skipped, 0);
    assert!(root.join("public/blog/wip/index.html").exists());

    let entries = search::load_index(&root.join("public/search.json")).unwrap();
    assert!(entries.iter().all(|entry| entry.url != "/blog/wip/"));
}

#[test]
fn failed_build_leaves_previous_output_untouched() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    build(root).unwrap();
    write_file(root, "public/marker.txt", "previous");

    write_file(root, "content/blog.md", "---\ntitle: Blog page\n---\nClash.\n");
    let error = build(root).unwrap_err();

    match error.downcast_ref::<BuildError>() {
        Some(BuildError::UrlConflict { url, first, second }) => {
            assert_eq!(url, "/blog/");
            assert!(first.contains("blog.md"));
            assert!(second.contains("section 'blog'"));
        }
        other => panic!("expected url conflict, got {other:?}"),
    }
    assert_eq!(read(root, "public/marker.txt"), "previous");
    assert!(root.join("public/blog/hello/index.html").exists());
    assert!(staging_leftovers(root).is_empty());
}

#[test]
fn successful_build_replaces_previous_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    build(root).unwrap();
    write_file(root, "public/stale.html", "old");

    build(root).unwrap();

    assert!(!root.join("public/stale.html").exists());
    assert!(root.join("public/index.html").exists());
}

#[test]
fn missing_layout_aborts_without_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        "templates/layouts/base.html",
        "<html>{{ content }}</html>",
    );

    let error = build(root).unwrap_err();

    match error.downcast_ref::<BuildError>() {
        Some(BuildError::LayoutMissing { candidates, .. }) => {
            assert!(candidates.contains(&"layouts/page.html".to_string()));
        }
        other => panic!("expected missing layout, got {other:?}"),
    }
    assert!(!root.join("public").exists());
}

#[test]
fn invalid_front_matter_names_the_file() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(root, "content/broken.md", "---\ndate: 2024-01-01\n---\nNo title.\n");

    let error = build(root).unwrap_err();

    match error.downcast_ref::<BuildError>() {
        Some(BuildError::Validation { path, .. }) => {
            assert!(path.ends_with("broken.md"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn section_layout_overrides_page_layout() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        "templates/layouts/blog.html",
        r#"<p class="post">{{ page.title }} in {{ page.section }}</p>"#,
    );
    write_file(
        root,
        "templates/layouts/blog-list.html",
        r#"<p class="listing">{{ section.title }}: {{ pages | length }}</p>"#,
    );

    build(root).unwrap();

    let hello = read(root, "public/blog/hello/index.html");
    assert!(hello.contains(r#"<p class="post">Hello in blog</p>"#));
    assert!(hello.contains("<title>Hello - Test Site</title>"));
    let about = read(root, "public/about/index.html");
    assert!(about.contains("<h1>About</h1>"));
    let blog = read(root, "public/blog/index.html");
    assert!(blog.contains(r#"<p class="listing">Blog: 2</p>"#));
}

#[test]
fn disabled_search_writes_no_index() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        CONFIG_FILE,
        "name: Test Site\nbase_url: https://example.com\nsearch:\n  enabled: false\n",
    );

    let report = build(root).unwrap();

    assert_eq!(report.search_entries, None);
    assert!(!root.join("public/search.json").exists());
    assert!(!read(root, "public/index.html").contains("data-index-url"));
}

#[test]
fn search_index_follows_configured_path() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        CONFIG_FILE,
        "name: Test Site\nbase_url: https://example.com\nsearch:\n  asset_path: /assets/index.json\n",
    );

    build(root).unwrap();

    assert!(root.join("public/assets/index.json").exists());
    assert!(read(root, "public/index.html").contains("index.json"));
}

#[test]
fn aliases_redirect_but_stay_out_of_listings() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        "content/blog/moved.md",
        "---\ntitle: Moved\naliases: [/old/moved, legacy.html]\n---\nNew home.\n",
    );

    let report = build(root).unwrap();
    assert_eq!(report.aliases, 2);

    let redirect = read(root, "public/old/moved/index.html");
    assert!(redirect.contains(r#"<link rel="canonical" href="https://example.com/blog/moved/">"#));
    assert!(redirect.contains("http-equiv=\"refresh\""));
    assert!(root.join("public/legacy.html").exists());

    assert!(!read(root, "public/sitemap.xml").contains("old/moved"));
    assert!(!read(root, "public/feed.xml").contains("old/moved"));
    assert!(!read(root, "public/search.json").contains("old/moved"));
}

#[test]
fn static_assets_never_overwrite_generated_files() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(root, "static/css/site.css", "body { margin: 0; }");
    write_file(root, "static/robots.txt", "User-agent: *\nDisallow: /\n");

    let report = build(root).unwrap();

    assert_eq!(report.static_copied, 1);
    assert_eq!(read(root, "public/css/site.css"), "body { margin: 0; }");
    assert!(read(root, "public/robots.txt").contains("Allow: /"));
}

#[test]
fn output_override_is_resolved_against_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);

    let options = BuildOptions {
        output: Some(PathBuf::from("dist")),
        ..BuildOptions::default()
    };
    let report = build_site(root, &options).unwrap();

    assert_eq!(report.output, root.join("dist"));
    assert!(root.join("dist/index.html").exists());
    assert!(!root.join("public").exists());
}

#[test]
fn refuses_to_replace_the_project_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);

    let options = BuildOptions {
        output: Some(PathBuf::from(".")),
        ..BuildOptions::default()
    };
    let error = build_site(root, &options).unwrap_err();

    assert!(error.to_string().contains("refusing"));
    assert!(root.join("content/about.md").exists());
}

#[test]
fn clean_removes_output_directory() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    build(root).unwrap();

    let removed = clean_output(root).unwrap();
    assert_eq!(removed, Some(root.join("public")));
    assert!(!root.join("public").exists());

    assert_eq!(clean_output(root).unwrap(), None);
}

#[test]
fn verbose_build_writes_the_same_site() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);

    let options = BuildOptions {
        verbose: true,
        ..Default::default()
    };
    let report = build_site(root, &options).unwrap();

    assert_eq!(report.pages, 3);
    assert!(root.join("public/feed.xml").exists());
    assert!(root.join("public/search.json").exists());
}

#[test]
fn search_index_colliding_with_a_page_aborts_the_build() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    setup_project(root);
    write_file(
        root,
        CONFIG_FILE,
        "name: Test Site\nbase_url: https://example.com\nsearch:\n  asset_path: /about/\n",
    );

    let error = build(root).unwrap_err();
    assert!(matches!(
        error.downcast_ref::<BuildError>(),
        Some(BuildError::UrlConflict { url, .. }) if url == "/about/"
    ));
    assert!(!root.join("public").exists());
}
