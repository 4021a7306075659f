//! 搜索文本折叠：小写 + 去除变音符号
//!
//! 先做 NFD 分解，再丢弃组合附加符号，"Játék" 与 "jatek" 折叠后相同。
//! 匈牙利语的 ő/ű（双锐音符）同样会被还原为 o/u。

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

pub fn fold_for_search(text: &str) -> String {
    text.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}
