use super::{build_cards, CardRecord, Locale, PageControls, PageView, PriceFormat};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Only http(s) links make it into `href` or `src`.
fn web_url(value: Option<&str>) -> Option<&str> {
    let value = value?.trim();
    let lower = value.to_ascii_lowercase();
    if lower.starts_with("https://") || lower.starts_with("http://") {
        Some(value)
    } else {
        None
    }
}

fn render_card(card: &CardRecord, price: &PriceFormat) -> String {
    let badge = if card.discount > 0 {
        format!(
            r#"<div class="absolute top-4 left-4 rounded-full bg-fuchsia-600 text-white font-black px-4 py-1 text-sm shadow-md">-{}%</div>"#,
            card.discount
        )
    } else {
        String::new()
    };
    let image = match web_url(card.image.as_deref()) {
        Some(src) => format!(
            r#"<img src="{}" alt="{}" class="h-48 w-full object-contain" loading="lazy"/>"#,
            escape_html(src),
            escape_html(&card.title)
        ),
        None => r#"<div class="h-48 w-full bg-slate-100 rounded-2xl"></div>"#.to_string(),
    };
    let old_price = match card.old_price_label.as_deref() {
        Some(old) => format!(
            r#"<span class="text-sm line-through text-slate-300 font-medium">{}</span>"#,
            escape_html(old)
        ),
        None => String::new(),
    };
    let stars = match card.stars.as_deref() {
        Some(stars) => format!(
            r#"<div class="text-yellow-400 text-xs tracking-tighter">{stars}</div>"#
        ),
        None => String::new(),
    };
    let action = match web_url(card.url.as_deref()) {
        Some(url) => format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer" class="block text-center rounded-xl bg-primary text-white font-bold py-3 shadow-lg hover:shadow-xl transition-shadow">{}</a>"#,
            escape_html(url),
            price.locale.call_to_action()
        ),
        None => String::new(),
    };

    format!(
        r#"
        <article class="bg-white shadow-sm hover:shadow-2xl transition-all duration-300 border border-slate-100 rounded-3xl overflow-hidden">
          <figure class="relative p-6 bg-white">
            {badge}
            {image}
          </figure>
          <div class="p-6 flex flex-col gap-3">
            <p class="text-[10px] text-slate-400 font-bold uppercase tracking-widest">{category}</p>
            <h2 class="font-bold text-sm leading-tight line-clamp-2">{title}</h2>
            <div class="flex items-center gap-2">
              <span class="text-2xl font-black text-primary">{price_label}</span>
              {old_price}
            </div>
            {stars}
            {action}
          </div>
        </article>"#,
        category = escape_html(&card.category),
        title = escape_html(&card.title),
        price_label = escape_html(&card.price_label),
    )
}

fn render_controls(controls: &PageControls) -> String {
    if controls.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let edge = |label: &str, target: Option<usize>| match target {
        Some(page) => format!(
            r#"<button data-page="{page}" class="rounded-xl px-4 py-2 text-slate-600 hover:bg-slate-200" type="button">{label}</button>"#
        ),
        None => format!(
            r#"<button class="rounded-xl px-4 py-2 text-slate-300 opacity-50" type="button" disabled>{label}</button>"#
        ),
    };
    out.push_str(&edge("&lsaquo;", controls.prev));
    for button in controls.buttons.iter() {
        if button.current {
            out.push_str(&format!(
                r#"<button data-page="{n}" aria-current="page" class="rounded-xl px-4 py-2 bg-primary text-white shadow-md" type="button">{n}</button>"#,
                n = button.number
            ));
        } else {
            out.push_str(&format!(
                r#"<button data-page="{n}" class="rounded-xl px-4 py-2 text-slate-500 hover:bg-slate-200" type="button">{n}</button>"#,
                n = button.number
            ));
        }
    }
    out.push_str(&edge("&rsaquo;", controls.next));
    out
}

/// Standalone HTML snapshot of one page: header, card grid and page
/// selector. Needs no script to display.
pub fn render_html(view: &PageView<'_>, price: &PriceFormat) -> Vec<u8> {
    let locale = price.locale;
    let grid = if view.is_empty() {
        format!(
            r#"<p class="col-span-full text-center py-20 text-slate-400">{}</p>"#,
            locale.no_results()
        )
    } else {
        build_cards(view, price)
            .iter()
            .map(|card| render_card(card, price))
            .collect::<Vec<_>>()
            .join("")
    };
    let search = if view.search_term.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="rounded-xl bg-slate-100 px-4 py-2">{}: &quot;{}&quot;</span>"#,
            locale.search(),
            escape_html(view.search_term)
        )
    };

    let html = format!(
        r####"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>dealgrid</title>
  <script src="https://cdn.tailwindcss.com"></script>
  <script id="tailwind-config">
    tailwind.config = {{
      theme: {{
        extend: {{
          colors: {{
            "primary": "#135bec"
          }}
        }}
      }}
    }};
  </script>
</head>
<body class="bg-slate-50 text-slate-900 min-h-screen">
  <header class="flex items-center justify-between border-b border-slate-200 bg-white px-8 py-4 sticky top-0 z-50">
    <h1 class="text-xl font-black uppercase tracking-tight">dealgrid</h1>
    <div class="flex items-center gap-3 text-sm font-bold text-slate-500">
      <span><span id="deal-count">{count}</span> {deals}</span>
      {search}
      <span class="rounded-xl bg-slate-100 px-4 py-2">{sort_title}: {sort}</span>
    </div>
  </header>

  <main class="max-w-[1440px] mx-auto w-full px-8 py-10">
    <div id="product-grid" class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-3 xl:grid-cols-4 gap-6">{grid}
    </div>
    <nav id="pagination" class="flex flex-wrap justify-center gap-2 mt-10">{controls}</nav>
  </main>
</body>
</html>
"####,
        lang = locale.as_str(),
        count = view.total_matches,
        deals = locale.deals(),
        search = search,
        sort_title = locale.sort(),
        sort = locale.sort_label(view.sort_mode),
        grid = grid,
        controls = render_controls(&view.controls()),
    );

    html.into_bytes()
}

pub fn render_error_html(message: &str, locale: Locale) -> Vec<u8> {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
  <meta charset="utf-8"/>
  <title>dealgrid</title>
</head>
<body>
  <div id="product-grid">
    <div class="col-span-full text-center py-20">
      <p class="text-red-500 font-bold">{title}</p>
      <p class="text-slate-400 text-sm">{hint}</p>
      <p class="text-slate-300 text-xs">{detail}</p>
    </div>
  </div>
</body>
</html>
"#,
        lang = locale.as_str(),
        title = locale.load_error_title(),
        hint = locale.load_error_hint(),
        detail = escape_html(message),
    )
    .into_bytes()
}
