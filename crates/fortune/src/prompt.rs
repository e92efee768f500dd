use shenji_core::chart::entity::{BaziChart, Pillar};

fn format_pillar(p: &Pillar) -> String {
    let hidden: Vec<String> = p
        .hidden_stems
        .iter()
        .zip(&p.hidden_ten_gods)
        .map(|(stem, god)| format!("{}[{}]", stem, god))
        .collect();
    format!(
        "{} {} [{}] (藏: {})",
        p.stem_label(),
        p.gan_zhi,
        p.na_yin,
        hidden.join(" ")
    )
}

/// # Summary
/// 将命盘渲染为文本，作为命理解读对话的首轮输入。
///
/// # Logic
/// 依次输出性别、公历、四柱（十神、干支、纳音、藏干十神）与大运列表。
pub fn format_chart_for_prompt(chart: &BaziChart) -> String {
    let da_yun = chart
        .da_yun
        .iter()
        .map(|d| format!("{}岁起运: {}", d.start_age, d.label))
        .collect::<Vec<_>>()
        .join("\n    ");
    format!(
        "性别: {}\n阳历: {}\n八字: 年[{}] 月[{}] 日[{}] 时[{}]\n大运列表:\n{}",
        chart.gender,
        chart.solar_date,
        format_pillar(&chart.year),
        format_pillar(&chart.month),
        format_pillar(&chart.day),
        format_pillar(&chart.hour),
        da_yun
    )
}
