use std::fs;
use texture_store::assets::{
    AssetDirSource, BundledSource, FileSource, Source, SourceChain, SourceError,
};
use texture_store::LoadError;

#[test]
fn file_source_reads_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tile.bin");
    fs::write(&path, b"tile").unwrap();

    let key = path.to_string_lossy();
    assert_eq!(FileSource.try_open(&key).unwrap(), b"tile");

    let missing = dir.path().join("missing.bin");
    assert!(matches!(
        FileSource.try_open(&missing.to_string_lossy()),
        Err(SourceError::Io { .. })
    ));
}

#[test]
fn bundled_resources_can_be_added_after_the_fact() {
    let bundled = BundledSource::new().with("icon", b"icon bytes");
    let chain = SourceChain::empty().with(bundled.clone());

    assert_eq!(chain.open("icon").unwrap().bytes, b"icon bytes");
    assert!(chain.open("cursor").is_err());

    bundled.insert("cursor", b"cursor bytes".to_vec());
    assert!(bundled.contains("cursor"));
    assert_eq!(chain.open("cursor").unwrap().origin, "bundled");

    assert!(bundled.remove("icon"));
    assert!(matches!(
        bundled.try_open("icon"),
        Err(SourceError::Unregistered { .. })
    ));
}

#[test]
fn asset_dir_source_reads_relative_keys() {
    let root = tempfile::tempdir().unwrap();
    fs::create_dir(root.path().join("ui")).unwrap();
    fs::write(root.path().join("ui").join("button.png"), b"button").unwrap();

    let assets = AssetDirSource::new(root.path());
    assert_eq!(assets.root(), root.path());
    assert_eq!(assets.try_open("ui/button.png").unwrap(), b"button");

    let absolute = root.path().join("ui").join("button.png");
    assert!(matches!(
        assets.try_open(&absolute.to_string_lossy()),
        Err(SourceError::Unsupported { .. })
    ));
}

#[test]
fn chain_stops_at_the_first_hit() {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("shared"), b"from disk").unwrap();

    let chain = SourceChain::empty()
        .with(BundledSource::new().with("shared", b"from bundle"))
        .with(AssetDirSource::new(root.path()));

    let opened = chain.open("shared").unwrap();
    assert_eq!(opened.origin, "bundled");
    assert_eq!(opened.bytes, b"from bundle");
}

#[test]
fn chain_lists_every_failed_attempt() {
    let root = tempfile::tempdir().unwrap();
    let chain = SourceChain::empty()
        .with(FileSource)
        .with(BundledSource::new())
        .with(AssetDirSource::new(root.path()));

    assert_eq!(chain.names(), ["file", "bundled", "asset"]);

    let err = chain.open("nope.png").unwrap_err();
    let LoadError::NotFound { key, attempts } = &err else {
        panic!("unexpected error: {err}");
    };

    assert_eq!(key, "nope.png");
    let origins: Vec<_> = attempts.iter().map(|a| a.origin).collect();
    assert_eq!(origins, ["file", "bundled", "asset"]);

    let message = err.to_string();
    assert!(message.contains("nope.png"));
    assert!(message.contains("bundled:"));
}

#[test]
fn empty_chain_finds_nothing() {
    let chain = SourceChain::empty();
    assert!(chain.is_empty());
    assert!(chain.open("anything").unwrap_err().is_not_found());
}

#[cfg(feature = "remote")]
mod remote {
    use std::time::Duration;
    use texture_store::assets::{Source, SourceError, UrlSource};

    #[test]
    fn only_http_keys_are_urls() {
        assert!(UrlSource::is_url("http://example.com/a.png"));
        assert!(UrlSource::is_url("HTTPS://example.com/a.png"));
        assert!(!UrlSource::is_url("ftp://example.com/a.png"));
        assert!(!UrlSource::is_url("assets/a.png"));
        assert!(!UrlSource::is_url("http"));
    }

    #[test]
    fn non_urls_are_refused_without_a_request() {
        let source = UrlSource::new(Duration::from_millis(10));
        assert!(matches!(
            source.try_open("assets/a.png"),
            Err(SourceError::Unsupported { .. })
        ));
    }

    #[test]
    fn standard_chain_ends_with_urls() {
        let chain = texture_store::assets::SourceChain::default();
        assert_eq!(chain.names(), ["file", "bundled", "asset", "url"]);
    }
}
