//! Beauty blog starter content
//!
//! Two categories, two authors, four tags and four bilingual posts loaded by
//! `BlogService::seed_beauty_blog`. Posts refer to their category, author and
//! tags by slug or email; the service resolves them to ids at seed time.

use crate::models::{NewBlogAuthor, NewBlogCategory, NewBlogTag};
use std::collections::BTreeMap;

/// Cover image shared by every seeded post
pub const FEATURED_IMAGE: &str = "https://images.unsplash.com/photo-1556228578-8c89e6adf883?w=800";

/// Gallery attached to every seeded post
pub const GALLERY: [&str; 2] = [
    "https://images.unsplash.com/photo-1556228578-8c89e6adf883?w=800",
    "https://images.unsplash.com/photo-1598440947619-2c35fc356ef3?w=800",
];

pub const READ_TIME_EN: &str = "8 min read";
pub const READ_TIME_AR: &str = "8 دقائق قراءة";

pub const SARAH_EMAIL: &str = "sarah@skinior.com";
pub const DR_MAYA_EMAIL: &str = "dr.maya@skinior.com";

/// A post before its references are resolved
#[derive(Debug, Clone, Copy)]
pub struct SeedPost {
    pub title_en: &'static str,
    pub title_ar: &'static str,
    pub excerpt_en: &'static str,
    pub excerpt_ar: &'static str,
    pub content_en: &'static str,
    pub content_ar: &'static str,
    /// English slug of the category
    pub category: &'static str,
    pub author_email: &'static str,
    /// English slugs of the tags
    pub tags: &'static [&'static str],
    pub featured: bool,
    pub views: i64,
    pub likes: i64,
}

pub fn categories() -> Vec<NewBlogCategory> {
    vec![
        NewBlogCategory {
            name_en: "Skincare".into(),
            name_ar: "العناية بالبشرة".into(),
            slug_en: "skincare".into(),
            slug_ar: "العناية-بالبشرة".into(),
            description_en: Some("Everything about skincare routines, products, and tips".into()),
            description_ar: Some("كل ما يتعلق بروتين العناية بالبشرة والمنتجات والنصائح".into()),
            color: Some("#FF6B9D".into()),
        },
        NewBlogCategory {
            name_en: "Makeup".into(),
            name_ar: "المكياج".into(),
            slug_en: "makeup".into(),
            slug_ar: "المكياج".into(),
            description_en: Some("Makeup tutorials, trends, and product reviews".into()),
            description_ar: Some("دروس المكياج والاتجاهات ومراجعات المنتجات".into()),
            color: Some("#C785F7".into()),
        },
    ]
}

fn links(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn authors() -> Vec<NewBlogAuthor> {
    vec![
        NewBlogAuthor {
            name_en: "Sarah Ahmed".into(),
            name_ar: "سارة أحمد".into(),
            email: SARAH_EMAIL.into(),
            avatar: Some("https://images.unsplash.com/photo-1494790108755-2616b612b786?w=400".into()),
            bio_en: Some("Certified skincare specialist with 8+ years of experience in beauty and wellness".into()),
            bio_ar: Some("أخصائية عناية بالبشرة معتمدة مع أكثر من 8 سنوات من الخبرة في الجمال والعافية".into()),
            social_links: links(&[
                ("instagram", "@sarahbeauty"),
                ("twitter", "@sarahskincare"),
                ("linkedin", "sarah-ahmed-beauty"),
            ]),
        },
        NewBlogAuthor {
            name_en: "Dr. Maya Hassan".into(),
            name_ar: "د. مايا حسن".into(),
            email: DR_MAYA_EMAIL.into(),
            avatar: Some("https://images.unsplash.com/photo-1559839734-2b71ea197ec2?w=400".into()),
            bio_en: Some("Board-certified dermatologist specializing in anti-aging and acne treatment".into()),
            bio_ar: Some("طبيبة جلدية معتمدة متخصصة في مكافحة الشيخوخة وعلاج حب الشباب".into()),
            social_links: links(&[("instagram", "@drmayaskin"), ("linkedin", "dr-maya-hassan")]),
        },
    ]
}

pub fn tags() -> Vec<NewBlogTag> {
    [
        ("Anti-Aging", "مكافحة الشيخوخة", "anti-aging", "مكافحة-الشيخوخة"),
        ("Acne", "حب الشباب", "acne", "حب-الشباب"),
        ("Moisturizer", "مرطب", "moisturizer", "مرطب"),
        ("Sunscreen", "واقي الشمس", "sunscreen", "واقي-الشمس"),
    ]
    .into_iter()
    .map(|(name_en, name_ar, slug_en, slug_ar)| NewBlogTag {
        name_en: name_en.into(),
        name_ar: name_ar.into(),
        slug_en: slug_en.into(),
        slug_ar: slug_ar.into(),
    })
    .collect()
}

pub const POSTS: [SeedPost; 4] = [
    SeedPost {
        title_en: "The Complete Guide to Building an Anti-Aging Skincare Routine in 2025",
        title_ar: "الدليل الكامل لبناء روتين العناية بالبشرة المضاد للشيخوخة في عام 2025",
        excerpt_en: "Discover the latest anti-aging ingredients and techniques that actually work, backed by science and dermatologist recommendations.",
        excerpt_ar: "اكتشف أحدث المكونات والتقنيات المضادة للشيخوخة التي تعمل فعلاً، بدعم من العلم وتوصيات أطباء الجلد.",
        content_en: r#"# The Complete Guide to Building an Anti-Aging Skincare Routine in 2025

Building an effective anti-aging routine doesn't have to be complicated or expensive. It's all about choosing the right products with proven ingredients.

## Understanding Skin Aging

Skin aging occurs due to two main factors:
- **Intrinsic aging**: Natural aging process controlled by genetics
- **Extrinsic aging**: Environmental factors like sun exposure, pollution, and lifestyle choices

## Essential Anti-Aging Ingredients

### 1. Retinoids
Still the gold standard for anti-aging, retinoids stimulate collagen production and accelerate cell turnover.

### 2. Vitamin C
A powerful antioxidant that brightens skin and protects against free radical damage.

### 3. Peptides
These amino acid chains signal skin to produce more collagen.

### 4. Niacinamide
This form of vitamin B3 improves skin texture, reduces pore appearance, and regulates oil production.

## Your Anti-Aging Routine

### Morning
1. Gentle cleanser
2. Vitamin C serum
3. Moisturizer with SPF 30+
4. Eye cream

### Evening
1. Double cleanse
2. Retinoid product (start 2-3x per week)
3. Peptide serum
4. Night moisturizer

Remember, consistency is key to seeing results. Start slow, be patient, and your skin will thank you!
"#,
        content_ar: r#"# الدليل الكامل لبناء روتين العناية بالبشرة المضاد للشيخوخة في عام 2025

بناء روتين فعال مضاد للشيخوخة لا يجب أن يكون معقداً أو مكلفاً، الأمر كله يتعلق باختيار المنتجات المناسبة مع المكونات المثبتة علمياً.

## فهم شيخوخة الجلد

تحدث شيخوخة الجلد بسبب عاملين رئيسيين:
- **الشيخوخة الداخلية**: عملية الشيخوخة الطبيعية التي تتحكم فيها الوراثة
- **الشيخوخة الخارجية**: العوامل البيئية مثل التعرض للشمس والتلوث وخيارات نمط الحياة

## المكونات الأساسية المضادة للشيخوخة

### 1. الريتينويد
لا يزال المعيار الذهبي لمكافحة الشيخوخة، حيث يحفز إنتاج الكولاجين ويسرع تجديد الخلايا.

### 2. فيتامين سي
مضاد أكسدة قوي يضيء البشرة ويحمي من أضرار الجذور الحرة.

### 3. الببتيدات
هذه السلاسل من الأحماض الأمينية تشير للبشرة لإنتاج المزيد من الكولاجين.

## روتينك المضاد للشيخوخة

### الصباح
1. منظف لطيف
2. سيروم فيتامين سي
3. مرطب مع SPF 30+

### المساء
1. تنظيف مزدوج
2. منتج الريتينويد
3. مرطب ليلي

تذكر، الاتساق هو مفتاح رؤية النتائج!
"#,
        category: "skincare",
        author_email: DR_MAYA_EMAIL,
        tags: &["anti-aging", "moisturizer"],
        featured: true,
        views: 842,
        likes: 47,
    },
    SeedPost {
        title_en: "How to Clear Acne Naturally: 7 Science-Backed Methods That Work",
        title_ar: "كيفية علاج حب الشباب طبيعياً: 7 طرق مدعومة علمياً تعمل بفعالية",
        excerpt_en: "Struggling with acne? Learn about natural, gentle methods to clear your skin without harsh chemicals or expensive treatments.",
        excerpt_ar: "تعاني من حب الشباب؟ تعلم عن الطرق الطبيعية واللطيفة لتنظيف بشرتك بدون مواد كيميائية قاسية أو علاجات مكلفة.",
        content_en: r#"# How to Clear Acne Naturally: 7 Science-Backed Methods That Work

Acne affects millions of people worldwide, but that doesn't mean you need to resort to harsh chemicals or expensive treatments.

## Understanding Acne

Acne occurs when hair follicles become clogged with oil and dead skin cells. Contributing factors include:
- Excess oil production
- Bacteria
- Inflammation
- Hormonal changes

## 7 Natural Acne-Fighting Methods

### 1. Tea Tree Oil
Can be as effective as benzoyl peroxide with fewer side effects. Use a 5-10% concentration and always dilute.

### 2. Green Tea
Rich in antioxidants and anti-inflammatory compounds.

### 3. Honey and Cinnamon Masks
Both ingredients have antimicrobial properties.

### 4. Aloe Vera
Use pure aloe vera gel as a soothing moisturizer.

### 5. Zinc
Zinc supplements can reduce inflammation and oil production.

### 6. Probiotics
A healthy gut microbiome can improve skin health.

### 7. A Low-Glycemic Diet
Reducing sugar and refined carbs helps keep breakouts in check.

Be patient: natural methods take time, but they are gentle on your skin.
"#,
        content_ar: r#"# كيفية علاج حب الشباب طبيعياً: 7 طرق مدعومة علمياً تعمل بفعالية

يؤثر حب الشباب على ملايين الأشخاص حول العالم، لكن هذا لا يعني أنك تحتاج إلى مواد كيميائية قاسية.

## فهم حب الشباب

يحدث حب الشباب عندما تنسد بصيلات الشعر بالزيوت وخلايا الجلد الميتة.

## 7 طرق طبيعية لمكافحة حب الشباب

### 1. زيت شجرة الشاي
فعال مثل البنزويل بيروكسايد مع آثار جانبية أقل.

### 2. الشاي الأخضر
غني بمضادات الأكسدة والمركبات المضادة للالتهابات.

### 3. أقنعة العسل والقرفة
كلا المكونين لهما خصائص مضادة للميكروبات.

### 4. الألوفيرا
استخدم جل الألوفيرا النقي كمرطب مهدئ.

كن صبوراً، فالطرق الطبيعية تحتاج وقتاً لكنها لطيفة على بشرتك.
"#,
        category: "skincare",
        author_email: SARAH_EMAIL,
        tags: &["acne"],
        featured: false,
        views: 615,
        likes: 32,
    },
    SeedPost {
        title_en: "Sunscreen 101: Why SPF 30 Isn't Always Enough in 2025",
        title_ar: "واقي الشمس 101: لماذا SPF 30 ليس كافياً دائماً في عام 2025",
        excerpt_en: "Think SPF 30 protects you all day? Think again. Learn about the latest sunscreen science and how to protect your skin properly.",
        excerpt_ar: "تعتقد أن SPF 30 يحميك طوال اليوم؟ فكر مرة أخرى. تعلم عن أحدث علوم واقي الشمس وكيفية حماية بشرتك بشكل صحيح.",
        content_en: r#"# Sunscreen 101: Why SPF 30 Isn't Always Enough in 2025

It's time to rethink our sunscreen strategy. Here's what you need to know about proper sun protection.

## Understanding SPF

SPF (Sun Protection Factor) measures protection against UVB rays only:
- SPF 15: Blocks 93% of UVB rays
- SPF 30: Blocks 97% of UVB rays
- SPF 50: Blocks 98% of UVB rays

## Why SPF 30 Might Not Be Enough

### 1. Application Amount
Most people apply only 25% of the recommended amount (2mg/cm²).

### 2. UVA Protection
SPF doesn't measure UVA protection, which causes premature aging.

### 3. Water and Sweat
Even water-resistant sunscreens lose effectiveness after 40-80 minutes in water.

## Application Tips

- Use a nickel-sized amount for the face
- Apply 15 minutes before sun exposure
- Reapply every 2 hours
- Don't forget ears, neck and hands

Daily sunscreen is the single best anti-aging product you can buy.
"#,
        content_ar: r#"# واقي الشمس 101: لماذا SPF 30 ليس كافياً دائماً في عام 2025

حان الوقت لإعادة التفكير في استراتيجية واقي الشمس.

## فهم عامل الحماية

يقيس عامل الحماية من الشمس الحماية من أشعة UVB فقط:
- SPF 15: يحجب 93% من الأشعة
- SPF 30: يحجب 97% من الأشعة
- SPF 50: يحجب 98% من الأشعة

## نصائح التطبيق

- استخدم كمية كافية للوجه
- ضعه قبل 15 دقيقة من التعرض للشمس
- أعد التطبيق كل ساعتين

واقي الشمس اليومي هو أفضل منتج لمكافحة الشيخوخة.
"#,
        category: "skincare",
        author_email: DR_MAYA_EMAIL,
        tags: &["sunscreen"],
        featured: true,
        views: 1024,
        likes: 55,
    },
    SeedPost {
        title_en: "The Minimalist Beauty Routine: 5 Products for Glowing Skin",
        title_ar: "روتين الجمال البسيط: 5 منتجات للحصول على بشرة متوهجة",
        excerpt_en: "Less is more! Discover how to achieve radiant, healthy skin with just 5 carefully chosen products that actually work.",
        excerpt_ar: "الأقل هو الأكثر! اكتشف كيفية الحصول على بشرة مشرقة وصحية مع 5 منتجات مختارة بعناية تعمل حقاً.",
        content_en: r#"# The Minimalist Beauty Routine: 5 Products for Glowing Skin

In a world obsessed with 10-step skincare routines, sometimes the best approach is the simplest one.

## Why Minimalist Skincare Works

- Less risk of irritation from too many active ingredients
- More cost-effective
- Easier to stick to consistently
- Better for sensitive skin

## The Essential 5-Product Routine

### 1. Gentle Cleanser
Removes dirt, oil, and makeup without stripping skin.

### 2. Vitamin C Serum
Antioxidant protection, brightening and collagen support.

### 3. Moisturizer
Look for ceramides and hyaluronic acid.

### 4. Sunscreen
Broad-spectrum SPF 30 or higher, every single morning.

### 5. Retinoid
Use at night, two or three times a week to start.

Quality over quantity: fewer, better products deliver real results.
"#,
        content_ar: r#"# روتين الجمال البسيط: 5 منتجات للحصول على بشرة متوهجة

في عالم مهووس بروتينات العناية المكونة من 10 خطوات، أحياناً يكون النهج الأبسط هو الأفضل.

## الروتين الأساسي من 5 منتجات

### 1. منظف لطيف
يزيل الأوساخ والزيوت دون تجريد البشرة.

### 2. سيروم فيتامين سي
حماية مضادة للأكسدة وإشراق.

### 3. مرطب
ابحث عن السيراميد وحمض الهيالورونيك.

### 4. واقي الشمس
عامل حماية 30 أو أعلى كل صباح.

### 5. الريتينويد
استخدمه ليلاً مرتين أو ثلاث مرات أسبوعياً.

الجودة أهم من الكمية.
"#,
        category: "skincare",
        author_email: SARAH_EMAIL,
        tags: &["moisturizer"],
        featured: false,
        views: 537,
        likes: 28,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posts_reference_seeded_taxonomy() {
        let categories: Vec<_> = categories().into_iter().map(|c| c.slug_en).collect();
        let tags: Vec<_> = tags().into_iter().map(|t| t.slug_en).collect();
        let emails: Vec<_> = authors().into_iter().map(|a| a.email).collect();

        for post in POSTS {
            assert!(categories.iter().any(|c| c == post.category), "{}", post.title_en);
            assert!(emails.iter().any(|e| e == post.author_email), "{}", post.title_en);
            for tag in post.tags {
                assert!(tags.iter().any(|t| t == tag), "{}", tag);
            }
        }
    }

    #[test]
    fn test_two_featured_posts() {
        assert_eq!(POSTS.iter().filter(|p| p.featured).count(), 2);
    }
}
