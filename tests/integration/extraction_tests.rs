use super::*;
use catalog_watcher::models::MISSING_URL;

const CATEGORY_PAGE: &str = r#"
<div class="product-card">
    <a class="image" href="/groente-aardappels/2e-klas-groentes/bloemkool"><img src="bloemkool.jpg"></a>
    <div class="info-container-wrapper">
        <span class="name">
            Bloemkool
        </span>
        <span class="price">1,25</span>
    </div>
</div>
<div class="product-card unavailable">
    <a class="image" href="/groente-aardappels/2e-klas-groentes/andijvie"></a>
    <div class="info-container-wrapper"><span class="name">Andijvie</span></div>
</div>
<div class="product-card">
    <div class="info-container-wrapper"><span class="name">Knolselderij</span></div>
</div>
<div class="product-card">
    <a class="image" href="https://www.hofweb.nl/groente-aardappels/2e-klas-groentes/rode-kool"></a>
    <div class="info-container-wrapper"><span class="name">Rode kool</span></div>
</div>
"#;

#[test]
fn test_category_page_extraction() {
    let extractor = ProductExtractor::new(&ExtractorConfig::default()).unwrap();
    let products = extractor.extract(CATEGORY_PAGE).unwrap();

    let names: Vec<_> = products.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Bloemkool", "Knolselderij", "Rode kool"]);
    assert_eq!(products[0].url, "/groente-aardappels/2e-klas-groentes/bloemkool");
    assert_eq!(products[1].url, MISSING_URL);
    assert!(!products[1].has_link());
}

#[test]
fn test_absolute_urls_against_origin() {
    let extractor = ProductExtractor::new(&ExtractorConfig::default()).unwrap();
    let products = extractor.extract(CATEGORY_PAGE).unwrap();
    let origin = "https://www.hofweb.nl";

    assert_eq!(
        products[0].absolute_url(origin),
        "https://www.hofweb.nl/groente-aardappels/2e-klas-groentes/bloemkool"
    );
    assert_eq!(
        products[2].absolute_url(origin),
        "https://www.hofweb.nl/groente-aardappels/2e-klas-groentes/rode-kool"
    );
}

#[test]
fn test_container_without_cards_is_an_empty_listing() {
    let extractor = ProductExtractor::new(&ExtractorConfig::default()).unwrap();
    let products = extractor.extract("<p>Er zijn geen producten gevonden.</p>").unwrap();

    assert!(products.is_empty());
}

#[test]
fn test_custom_selectors() {
    let config = ExtractorConfig {
        card_selector: "li.item".to_string(),
        name_selector: "h3".to_string(),
        link_selector: "a".to_string(),
    };
    let extractor = ProductExtractor::new(&config).unwrap();
    let products = extractor
        .extract(r#"<ul><li class="item"><h3>Pompoen</h3><a href="/pompoen">bekijk</a></li></ul>"#)
        .unwrap();

    assert_eq!(products, vec![Product::new("Pompoen", "/pompoen")]);
}
