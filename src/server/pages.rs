// 该文件是 Luoshen （洛神） 项目的一部分。
// src/server/pages.rs - HTML 页面
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");
const RESULTS_TEMPLATE: &str = include_str!("../../templates/results.html");
const RESULTS_PLACEHOLDER: &str = "{{results}}";

pub fn index_page() -> &'static str {
  INDEX_TEMPLATE
}

pub fn results_page(result_files: &[String]) -> String {
  let items = if result_files.is_empty() {
    "    <li>No results yet.</li>".to_string()
  } else {
    result_files
      .iter()
      .map(|name| result_item(name))
      .collect::<Vec<_>>()
      .join("\n")
  };

  RESULTS_TEMPLATE.replace(RESULTS_PLACEHOLDER, &items)
}

fn result_item(name: &str) -> String {
  let href = urlencoding::encode(name);
  let text = escape_html(name);
  format!(
    concat!(
      "    <li>\n",
      "      <a href=\"/result/{href}\"><img src=\"/result/{href}\" alt=\"{text}\"></a>\n",
      "      <span>{text}</span>\n",
      "      <form action=\"/delete/{href}\" method=\"post\">",
      "<button type=\"submit\">Delete</button></form>\n",
      "    </li>"
    ),
    href = href,
    text = text
  )
}

fn escape_html(text: &str) -> String {
  let mut escaped = String::with_capacity(text.len());
  for c in text.chars() {
    match c {
      '&' => escaped.push_str("&amp;"),
      '<' => escaped.push_str("&lt;"),
      '>' => escaped.push_str("&gt;"),
      '"' => escaped.push_str("&quot;"),
      '\'' => escaped.push_str("&#39;"),
      _ => escaped.push(c),
    }
  }
  escaped
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn index_has_upload_form() {
    let page = index_page();
    assert!(page.contains("action=\"/detect\""));
    assert!(page.contains("name=\"image\""));
    assert!(page.contains("multipart/form-data"));
  }

  #[test]
  fn results_list_links_and_delete_buttons() {
    let page = results_page(&["result_a.png".to_string(), "result_b c.jpg".to_string()]);
    assert!(!page.contains(RESULTS_PLACEHOLDER));
    assert!(page.contains("href=\"/result/result_a.png\""));
    assert!(page.contains("action=\"/delete/result_a.png\""));
    assert!(page.contains("/result/result_b%20c.jpg"));
  }

  #[test]
  fn results_escape_file_names() {
    let page = results_page(&["<b>.png".to_string()]);
    assert!(page.contains("&lt;b&gt;.png"));
    assert!(!page.contains("<b>.png"));
  }

  #[test]
  fn empty_results() {
    assert!(results_page(&[]).contains("No results yet."));
  }
}
