use serde::{Deserialize, Serialize};

/// # Summary
/// 五行枚举。
///
/// # Invariants
/// - 固定五个取值，序列化为单个汉字。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    #[serde(rename = "木")]
    Wood,
    #[serde(rename = "火")]
    Fire,
    #[serde(rename = "土")]
    Earth,
    #[serde(rename = "金")]
    Metal,
    #[serde(rename = "水")]
    Water,
}

/// # Summary
/// 单个五行的四种对应关系。
///
/// - `generate`: 我生者（泄我之气，食伤）
/// - `control`: 我克者（财）
/// - `weaken`: 生我者（印）。沿用既有命名，字段名并不表示"被它削弱"。
/// - `damage`: 克我者（官杀）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRelations {
    pub generate: Element,
    pub control: Element,
    pub weaken: Element,
    pub damage: Element,
}

/// 五行关系表，按 `Element::index()` 排列。
const RELATIONS: [ElementRelations; 5] = [
    // 木
    ElementRelations {
        generate: Element::Fire,
        control: Element::Earth,
        weaken: Element::Water,
        damage: Element::Metal,
    },
    // 火
    ElementRelations {
        generate: Element::Earth,
        control: Element::Metal,
        weaken: Element::Wood,
        damage: Element::Water,
    },
    // 土
    ElementRelations {
        generate: Element::Metal,
        control: Element::Water,
        weaken: Element::Fire,
        damage: Element::Wood,
    },
    // 金
    ElementRelations {
        generate: Element::Water,
        control: Element::Wood,
        weaken: Element::Earth,
        damage: Element::Fire,
    },
    // 水
    ElementRelations {
        generate: Element::Wood,
        control: Element::Fire,
        weaken: Element::Metal,
        damage: Element::Earth,
    },
];

/// # Summary
/// 两个五行之间互斥且完备的五种关系之一（以 `from` 为主体）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// 同类
    Same,
    /// 我生
    Generates,
    /// 我克
    Controls,
    /// 生我
    GeneratedBy,
    /// 克我
    ControlledBy,
}

impl Element {
    pub const ALL: [Element; 5] = [
        Element::Wood,
        Element::Fire,
        Element::Earth,
        Element::Metal,
        Element::Water,
    ];

    /// 在 `ALL` 中的下标
    pub fn index(self) -> usize {
        match self {
            Element::Wood => 0,
            Element::Fire => 1,
            Element::Earth => 2,
            Element::Metal => 3,
            Element::Water => 4,
        }
    }

    /// 查表获取该五行的生克关系
    pub fn relations(self) -> &'static ElementRelations {
        &RELATIONS[self.index()]
    }

    /// 以 `self` 为主体判定与 `other` 的关系。
    ///
    /// # Logic
    /// 先判同类，再依次匹配关系表中的四个方向；五行相生相克为闭环，
    /// 任意一对元素恰好落入其中一种。
    pub fn relation_to(self, other: Element) -> Relation {
        let rel = self.relations();
        if self == other {
            Relation::Same
        } else if rel.generate == other {
            Relation::Generates
        } else if rel.control == other {
            Relation::Controls
        } else if rel.weaken == other {
            Relation::GeneratedBy
        } else {
            Relation::ControlledBy
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Element::Wood => '木',
            Element::Fire => '火',
            Element::Earth => '土',
            Element::Metal => '金',
            Element::Water => '水',
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// # Summary
/// 五行集合，以位图存储，`Copy` 且不可变使用。
///
/// # Invariants
/// - 仅低 5 位有效，第 i 位对应 `Element::ALL[i]`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementSet(u8);

impl ElementSet {
    pub const EMPTY: ElementSet = ElementSet(0);

    pub fn from_elements(elements: &[Element]) -> Self {
        elements
            .iter()
            .fold(Self::EMPTY, |set, element| set.with(*element))
    }

    /// 返回加入 `element` 后的新集合
    #[must_use]
    pub fn with(self, element: Element) -> Self {
        ElementSet(self.0 | (1 << element.index()))
    }

    pub fn contains(self, element: Element) -> bool {
        self.0 & (1 << element.index()) != 0
    }

    pub fn len(self) -> usize {
        Element::ALL.iter().filter(|e| self.contains(**e)).count()
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn is_disjoint(self, other: ElementSet) -> bool {
        self.0 & other.0 == 0
    }

    pub fn union(self, other: ElementSet) -> ElementSet {
        ElementSet(self.0 | other.0)
    }

    /// 按五行固定顺序迭代
    pub fn iter(self) -> impl Iterator<Item = Element> {
        Element::ALL.into_iter().filter(move |e| self.contains(*e))
    }
}

impl Serialize for ElementSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ElementSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let elements = Vec::<Element>::deserialize(deserializer)?;
        Ok(ElementSet::from_elements(&elements))
    }
}
