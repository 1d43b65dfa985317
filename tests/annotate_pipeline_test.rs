use citemark::{AnnotateConfig, Annotator, FallbackPolicy, StaticTitles, TitleCache};

fn resolver() -> StaticTitles {
    let mut titles = StaticTitles::default();
    titles.insert("source:abc123def", "Kajian Risiko Diabetes");
    titles.insert("source:xyz789ghi", "Panduan Gaya Hidup Sehat");
    titles.insert("source:aaa111bbb", "Source A");
    titles.insert("source:ccc222ddd", "Source C");
    titles
}

#[tokio::test]
async fn repeated_entity_keeps_one_number_and_one_list_entry() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let out = annotator
        .annotate(
            "Risiko Anda tinggi [source:abc123def]. Konsultasikan [source:xyz789ghi] juga [source:abc123def].",
            &resolver(),
            &cache,
        )
        .await;

    assert_eq!(
        out.text,
        "Risiko Anda tinggi [1](#ref-source-abc123def). Konsultasikan [2](#ref-source-xyz789ghi) juga [1](#ref-source-abc123def)."
    );

    assert_eq!(out.references.len(), 2);
    assert_eq!(out.references[0].number, 1);
    assert_eq!(out.references[0].entity_id, "abc123def");
    assert_eq!(
        out.references[0].title.as_deref(),
        Some("Kajian Risiko Diabetes")
    );
    assert_eq!(out.references[1].number, 2);
    assert_eq!(out.references[1].entity_id, "xyz789ghi");
}

#[tokio::test]
async fn adjacent_tokens_merge_into_one_group() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let out = annotator
        .annotate("[source:aaa111bbb] [source:ccc222ddd]", &resolver(), &cache)
        .await;

    assert_eq!(out.text, "[1, 2](#ref-combined)");
    assert_eq!(out.references.len(), 2);
}

#[tokio::test]
async fn plain_text_is_a_noop_with_empty_references() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let text = "Berikut **rekomendasi** umum:\n\n- olahraga [30] menit\n- tidur cukup\n";
    let out = annotator.annotate(text, &resolver(), &cache).await;

    assert_eq!(out.text, text);
    assert!(out.references.is_empty());
    assert!(cache.is_empty()); // resolver never consulted
}

#[tokio::test]
async fn double_bracketed_tokens_are_normalized() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let out = annotator
        .annotate("Lihat [[source:abc123def]] untuk detail.", &resolver(), &cache)
        .await;

    assert_eq!(out.text, "Lihat [1](#ref-source-abc123def) untuk detail.");
}

#[tokio::test]
async fn annotating_annotated_output_changes_nothing() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let first = annotator
        .annotate(
            "Data [source:abc123def], [source:xyz789ghi] mendukung.",
            &resolver(),
            &cache,
        )
        .await;
    let second = annotator.annotate(&first.text, &resolver(), &cache).await;

    assert_eq!(second.text, first.text);
    assert!(second.references.is_empty());
}

#[tokio::test]
async fn numbering_follows_first_appearance_order() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let out = annotator
        .annotate(
            "B dulu [source:xyz789ghi], lalu A [source:abc123def].",
            &resolver(),
            &cache,
        )
        .await;

    assert!(out.text.contains("[1](#ref-source-xyz789ghi)"));
    assert!(out.text.contains("[2](#ref-source-abc123def)"));
    let numbers: Vec<u32> = out.references.iter().map(|r| r.number).collect();
    assert_eq!(numbers, vec![1, 2]);
}

#[tokio::test]
async fn custom_grammar_is_honored() {
    let config = AnnotateConfig::new()
        .with_entity_types(["note"])
        .with_fallback(FallbackPolicy::KeyAsTitle);
    let annotator = Annotator::new(config);
    let cache = TitleCache::new();

    let out = annotator
        .annotate(
            "A note [note:abcdef123] and a source [source:abc123def].",
            &StaticTitles::default(),
            &cache,
        )
        .await;

    // Only the configured type is rewritten; `source` stays raw text.
    assert_eq!(
        out.text,
        "A note [1](#ref-note-abcdef123) and a source [source:abc123def]."
    );
    assert_eq!(out.references.len(), 1);
    assert_eq!(out.references[0].title.as_deref(), Some("note:abcdef123"));
}

#[tokio::test]
async fn three_way_adjacency_with_mixed_separators() {
    let annotator = Annotator::default();
    let cache = TitleCache::new();

    let out = annotator
        .annotate(
            "Bukti kuat [source:abc123def], [source:xyz789ghi] [source:aaa111bbb].",
            &resolver(),
            &cache,
        )
        .await;

    assert_eq!(out.text, "Bukti kuat [1, 2, 3](#ref-combined).");
    assert_eq!(out.references.len(), 3);
}
